use async_trait::async_trait;

use notely_shared::clients::email::{EmailClient, EmailError};

/// Outbound user notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), EmailError>;
    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError>;
}

#[async_trait]
impl Notifier for EmailClient {
    async fn send_otp(&self, to: &str, code: &str, ttl_minutes: i64) -> Result<(), EmailError> {
        self.send_otp_code(to, code, ttl_minutes).await
    }

    async fn send_welcome(&self, to: &str, name: &str) -> Result<(), EmailError> {
        EmailClient::send_welcome(self, to, name).await
    }
}
