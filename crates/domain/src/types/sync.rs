//! Sync job results and the JSON envelopes returned to callers.

use serde::{Deserialize, Serialize};

/// Aggregate outcome of one contact sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub companies_synced: usize,
    pub contacts_synced: usize,
    pub contacts_linked: usize,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Success envelope, returned even when individual records failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEnvelope {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

impl From<SyncReport> for SyncEnvelope {
    fn from(report: SyncReport) -> Self {
        Self { success: true, report }
    }
}

/// Failure envelope for fatal precondition or unexpected errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_is_flat() {
        let report = SyncReport {
            companies_synced: 2,
            contacts_synced: 3,
            contacts_linked: 1,
            errors: vec!["Contact p9: rejected".into()],
            duration_ms: 42,
        };

        let value = serde_json::to_value(SyncEnvelope::from(report)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "companies_synced": 2,
                "contacts_synced": 3,
                "contacts_linked": 1,
                "errors": ["Contact p9: rejected"],
                "duration_ms": 42
            })
        );
    }

    #[test]
    fn error_envelope_has_single_field() {
        let value = serde_json::to_value(ErrorEnvelope::new("boom")).unwrap();
        assert_eq!(value, json!({ "error": "boom" }));
    }
}
