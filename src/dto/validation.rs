//! Validation helpers for DTOs and path parameters.

use validator::ValidationError;

/// Longest identifier the `player_id VARCHAR(255)` column accepts.
pub const MAX_PLAYER_ID_LEN: usize = 255;

/// Validates that a player ID is non-empty, fits the key column and has no control characters.
///
/// # Examples
///
/// ```ignore
/// validate_player_id("player-42") // Ok
/// validate_player_id("")          // Err - empty
/// validate_player_id("a\nb")      // Err - control character
/// ```
pub fn validate_player_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() || id.chars().count() > MAX_PLAYER_ID_LEN {
        let mut err = ValidationError::new("player_id_length");
        err.message = Some(
            format!(
                "Player ID must be between 1 and {MAX_PLAYER_ID_LEN} characters (got {})",
                id.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    if id.chars().any(char::is_control) {
        let mut err = ValidationError::new("player_id_format");
        err.message = Some("Player ID must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_id_valid() {
        assert!(validate_player_id("player-42").is_ok());
        assert!(validate_player_id("ab").is_ok());
        assert!(validate_player_id("joueur é").is_ok());
        assert!(validate_player_id(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn test_validate_player_id_invalid_length() {
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_player_id_invalid_format() {
        assert!(validate_player_id("a\nb").is_err());
        assert!(validate_player_id("tab\there").is_err());
        assert!(validate_player_id("nul\0").is_err());
    }
}
