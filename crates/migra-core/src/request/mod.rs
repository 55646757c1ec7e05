//! Requests as seen by the migration engine.
//!
//! The engine only needs a narrow view of a request: its id, the
//! needs-migration predicate, and an ordered, index-stable list of
//! parameters it can rewrite on a deep copy. [`MigratableRequest`] is that
//! view; [`AssetRequest`] is the concrete model shipped with this crate.

mod model;
mod repository;

pub use model::{Asset, AssetRequest, Param};
pub use repository::RequestRepository;

/// The capabilities the migration engine requires from a request.
///
/// `Clone` must produce an independent deep copy; the engine mutates the
/// copy and never the original.
pub trait MigratableRequest: Clone {
    /// Identifier of the request, used in every log line.
    fn id(&self) -> &str;

    /// Whether the request carries legacy data under `key`.
    fn needs_migration(&self, key: &str) -> bool;

    /// Looks up a parameter by id.
    fn param(&self, id: &str) -> Option<&Param>;

    /// All parameters, in their stable order.
    fn params(&self) -> &[Param];

    /// Mutable access to the parameters, same order as [`params`](Self::params).
    fn params_mut(&mut self) -> &mut [Param];
}
