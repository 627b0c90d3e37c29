use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Entry of the admin "recently active" listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Obfuscated player identifier.
    pub player_id: String,
    /// First and last character of the identifier, e.g. `a...e`.
    pub display_name: String,
    /// Save timestamp embedded in the session document (epoch seconds).
    pub last_modified: f64,
}

/// Query parameters for `GET /sessions/{player_id}/inputs`.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct InputsQuery {
    /// Number of most recent player inputs to return.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_inputs")]
    pub n: usize,
}

/// Most recent player inputs, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct InputsResponse {
    pub inputs: Vec<String>,
}

/// Query parameters for `GET /admin/sessions/recent`.
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct RecentSessionsQuery {
    /// Maximum number of sessions to list.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Moderation request attaching a pending punishment to a session.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PunishmentRequest {
    #[validate(length(min = 1, max = 64))]
    pub level: String,
    #[validate(length(min = 1, max = 1024))]
    pub reason: String,
}

fn default_inputs() -> usize {
    5
}

fn default_limit() -> u32 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let inputs: InputsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(inputs.n, 5);
        let recent: RecentSessionsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(recent.limit, 10);
    }

    #[test]
    fn limits_are_bounded() {
        assert!(RecentSessionsQuery { limit: 0 }.validate().is_err());
        assert!(RecentSessionsQuery { limit: 101 }.validate().is_err());
        assert!(InputsQuery { n: 3 }.validate().is_ok());
    }

    #[test]
    fn punishment_requires_level_and_reason() {
        let empty = PunishmentRequest {
            level: String::new(),
            reason: "spam".into(),
        };
        assert!(empty.validate().is_err());
        let ok = PunishmentRequest {
            level: "mute".into(),
            reason: "spam".into(),
        };
        assert!(ok.validate().is_ok());
    }
}
