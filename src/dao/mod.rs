/// Schema bootstrap for the `game_sessions` table.
pub mod bootstrap;
/// Connection provider resolving `DATABASE_URL` into the active backend.
pub mod connection;
/// Database model definitions.
pub mod models;
/// Session persistence backends.
pub mod session_backend;
/// Storage abstraction layer for database operations.
pub mod storage;
