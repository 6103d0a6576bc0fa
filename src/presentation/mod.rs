// Presentation layer - HTTP routing and JSON rendering
pub mod app_state;
pub mod handlers;
pub mod router;
