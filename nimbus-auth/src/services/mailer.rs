use async_trait::async_trait;

use nimbus_shared::clients::email::EmailClient;

/// Outbound notification seam. A failed send comes back as a value; the
/// account service decides what state to unwind.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, name: &str, token: &str) -> Result<(), String>;

    async fn send_password_reset(&self, to: &str, name: &str, token: &str) -> Result<(), String>;
}

#[async_trait]
impl Mailer for EmailClient {
    async fn send_verification(&self, to: &str, name: &str, token: &str) -> Result<(), String> {
        self.send_verification_link(to, name, token).await
    }

    async fn send_password_reset(&self, to: &str, name: &str, token: &str) -> Result<(), String> {
        self.send_password_reset_link(to, name, token).await
    }
}
