//! Chat message persistence and handling.

mod models;
mod repository;
mod service;

pub use models::{CreateMessage, Message, MessageResponse, MessageUser};
pub use repository::MessageRepository;
pub use service::MessageService;
