//! Record behaviour configuration.

use serde::{Deserialize, Serialize};

/// Configuration for record lifecycle behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Reload the full row from storage after a successful create.
    pub auto_reload: bool,
    /// Append every operation result to the record's result history.
    pub save_results: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            auto_reload: true,
            save_results: true,
        }
    }
}

impl RecordConfig {
    pub const fn auto_reload(mut self, value: bool) -> Self {
        self.auto_reload = value;
        self
    }

    pub const fn save_results(mut self, value: bool) -> Self {
        self.save_results = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecordConfig::default();
        assert!(config.auto_reload);
        assert!(config.save_results);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: RecordConfig = serde_json::from_str(r#"{"auto_reload": false}"#).unwrap();
        assert!(!config.auto_reload);
        assert!(config.save_results);
    }
}
