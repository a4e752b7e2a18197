//! # Route Handlers
//!
//! Each submodule covers one area of the API surface. Handlers return
//! `Result<_, AppError>` so every failure renders as the standard
//! `{"success": false, "error": ...}` JSON body.

pub mod auth_handlers;
pub mod chat_handlers;
pub mod general;
pub mod quiz_handlers;
pub mod upload_handlers;
pub mod voice_handlers;

pub use auth_handlers::*;
pub use chat_handlers::*;
pub use general::*;
pub use quiz_handlers::*;
pub use upload_handlers::*;
pub use voice_handlers::*;
