use async_trait::async_trait;

/// A rendered email ready for transport.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        email: &OutboundEmail,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
