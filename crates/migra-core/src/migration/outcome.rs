//! Per-call bookkeeping of parameter outcomes.

use serde::{Deserialize, Serialize};

/// How a single parameter was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamOutcome {
    /// Value assigned from a transformation or the payload.
    Succeeded,
    /// Resolution raised a [`MigrationParamError`](super::MigrationParamError).
    Failed,
    /// Neither a transformation nor a payload field exists for it.
    Skipped,
}

/// Outcome of every parameter processed in one migration.
///
/// `processed` is the disjoint union of the three buckets. Every list keeps
/// the order in which parameters were recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeSet {
    processed: Vec<String>,
    succeeded: Vec<String>,
    failed: Vec<String>,
    skipped: Vec<String>,
}

impl OutcomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of a parameter.
    pub fn record(&mut self, param_id: impl Into<String>, outcome: ParamOutcome) {
        let param_id = param_id.into();
        match outcome {
            ParamOutcome::Succeeded => self.succeeded.push(param_id.clone()),
            ParamOutcome::Failed => self.failed.push(param_id.clone()),
            ParamOutcome::Skipped => self.skipped.push(param_id.clone()),
        }
        self.processed.push(param_id);
    }

    pub fn processed(&self) -> &[String] {
        &self.processed
    }

    pub fn succeeded(&self) -> &[String] {
        &self.succeeded
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Returns the recorded outcome of `param_id`, if it was processed.
    pub fn outcome_of(&self, param_id: &str) -> Option<ParamOutcome> {
        let contains = |ids: &[String]| ids.iter().any(|id| id == param_id);
        if contains(&self.succeeded) {
            Some(ParamOutcome::Succeeded)
        } else if contains(&self.failed) {
            Some(ParamOutcome::Failed)
        } else if contains(&self.skipped) {
            Some(ParamOutcome::Skipped)
        } else {
            None
        }
    }

    /// One-line summary, e.g.
    /// `5 processed, 1 succeeded (email), 1 failed (team_name), 3 skipped (a, b, c).`
    pub fn summary(&self) -> String {
        format!(
            "{} processed, {} succeeded{}, {} failed{}, {} skipped{}.",
            self.processed.len(),
            self.succeeded.len(),
            format_params(&self.succeeded),
            self.failed.len(),
            format_params(&self.failed),
            self.skipped.len(),
            format_params(&self.skipped),
        )
    }
}

fn format_params(params: &[String]) -> String {
    if params.is_empty() {
        String::new()
    } else {
        format!(" ({})", params.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_with_empty_buckets() {
        let mut outcome = OutcomeSet::new();
        for id in ["email", "num_licensed_users", "reseller_id"] {
            outcome.record(id, ParamOutcome::Skipped);
        }

        assert_eq!(
            outcome.summary(),
            "3 processed, 0 succeeded, 0 failed, 3 skipped (email, num_licensed_users, reseller_id)."
        );
    }

    #[test]
    fn test_summary_keeps_recording_order() {
        let mut outcome = OutcomeSet::new();
        outcome.record("team_name", ParamOutcome::Succeeded);
        outcome.record("email", ParamOutcome::Failed);
        outcome.record("abc", ParamOutcome::Succeeded);

        assert_eq!(
            outcome.summary(),
            "3 processed, 2 succeeded (team_name, abc), 1 failed (email), 0 skipped."
        );
    }

    #[test]
    fn test_processed_is_disjoint_union() {
        let mut outcome = OutcomeSet::new();
        outcome.record("a", ParamOutcome::Succeeded);
        outcome.record("b", ParamOutcome::Failed);
        outcome.record("c", ParamOutcome::Skipped);
        outcome.record("d", ParamOutcome::Skipped);

        let total = outcome.succeeded().len() + outcome.failed().len() + outcome.skipped().len();
        assert_eq!(outcome.processed().len(), total);
        assert_eq!(outcome.processed(), ["a", "b", "c", "d"]);
        assert_eq!(outcome.outcome_of("b"), Some(ParamOutcome::Failed));
        assert_eq!(outcome.outcome_of("z"), None);
        assert!(outcome.has_failures());
    }
}
