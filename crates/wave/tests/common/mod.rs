//! Test utilities and common setup.

use std::sync::Arc;

use axum::Router;
use wave::api::{self, AppState};
use wave::auth::{AuthConfig, AuthState};
use wave::db::Database;
use wave::message::{MessageRepository, MessageService};
use wave::user::{UserRepository, UserService};
use wave::ws::{ChatConfig, Hub};

/// Create a test AuthConfig with a JWT secret for testing.
fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    // Set a JWT secret for tests (required for token generation)
    config.jwt_secret = Some("test-secret-for-integration-tests-minimum-32-chars".to_string());
    config
}

/// Create a test application with all services initialized.
pub async fn test_app() -> Router {
    let (router, _state) = test_app_with_state().await;
    router
}

/// Create a test application and also return its state so tests can
/// reach the services behind the router.
pub async fn test_app_with_state() -> (Router, AppState) {
    // Use in-memory database for tests
    let db = Database::in_memory().await.unwrap();

    let auth_config = test_auth_config();
    let auth_state = AuthState::new(auth_config);

    let user_repo = UserRepository::new(db.pool().clone());
    let user_service = UserService::new(user_repo.clone());

    let message_repo = MessageRepository::new(db.pool().clone());
    let message_service = Arc::new(MessageService::new(message_repo, user_repo));

    let (hub, hub_handle) = Hub::new(message_service.clone());
    tokio::spawn(hub.run());

    let state = AppState {
        users: user_service,
        messages: message_service,
        auth: auth_state,
        hub: hub_handle,
        chat: ChatConfig::default(),
    };

    (api::create_router(state.clone()), state)
}
