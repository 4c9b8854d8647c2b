pub mod auth_service;
pub mod identity;
pub mod note_service;
pub mod notifier;
pub mod password;
