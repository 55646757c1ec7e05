//! Request repository trait.
//!
//! Defines the interface for loading and storing requests.

use super::model::AssetRequest;
use crate::error::Result;

/// An abstract repository for request persistence.
///
/// Decouples the migration workflow from where requests come from
/// (a JSON export, an API client, a test fixture).
pub trait RequestRepository: Send + Sync {
    /// Retrieves all requests from storage.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<AssetRequest>)`: All stored requests, in storage order
    /// - `Err(MigraError)`: Error if retrieval fails
    fn load_all(&self) -> Result<Vec<AssetRequest>>;

    /// Saves all requests to storage, replacing existing ones.
    ///
    /// # Arguments
    ///
    /// * `requests` - The requests to save
    fn save_all(&self, requests: &[AssetRequest]) -> Result<()>;
}
