//! Row shapes shared by every session backend.

/// A single `game_sessions` row as read back from the database.
///
/// Columns are addressed by name so the same struct decodes rows from either dialect.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRow {
    pub player_id: String,
    pub session_data: Option<String>,
}

impl SessionRow {
    /// Serialized document, treating an empty blob the same as a missing one.
    pub fn payload(&self) -> Option<&str> {
        self.session_data
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
    }
}
