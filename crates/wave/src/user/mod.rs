//! User management module.
//!
//! Provides account registration, credential verification, and profile
//! updates on top of the sqlite store.

mod models;
mod repository;
mod service;

pub use models::{CreateUser, UpdateProfileRequest, User, UserInfo};
pub use repository::UserRepository;
pub use service::{RegisterRequest, UserService};
