use crate::constants::*;
use serde::{Deserialize, Serialize};

/// Caller-level construction policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForemanConfig {
    /// Fail with `NoDoorCandidate` instead of sealing a room without a door.
    pub require_door: bool,
    /// Run the obstruction check before reserving tiles.
    pub validate_area: bool,
    /// Samples kept per obstruction category.
    pub sample_cap: usize,
    /// Prefix for generated workspace names.
    pub workspace_prefix: String,
}

impl Default for ForemanConfig {
    fn default() -> Self {
        ForemanConfig {
            require_door: true,
            validate_area: true,
            sample_cap: OBSTRUCTION_SAMPLE_CAP,
            workspace_prefix: DEFAULT_WORKSPACE_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: ForemanConfig = serde_json::from_str(r#"{"require_door":false}"#).unwrap();
        assert!(!config.require_door);
        assert!(config.validate_area);
        assert_eq!(config.sample_cap, 5);
        assert_eq!(config.workspace_prefix, "room");
    }
}
