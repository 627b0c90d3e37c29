/// Post-commit fan-out of session changes.
pub mod broadcast;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Spectator Server-Sent Events stream.
pub mod live_service;
/// Player identifier obfuscation for admin listings.
pub mod obfuscation;
/// Session store operations.
pub mod session_service;
/// Player WebSocket connection handling.
pub mod websocket_service;
