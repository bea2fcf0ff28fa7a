pub mod bokun;
pub mod hostify;
pub mod smtp;
pub mod stripe;

pub use bokun::BokunClient;
pub use hostify::HostifyClient;
pub use smtp::SmtpMailer;
pub use stripe::StripeGateway;

#[derive(Debug, thiserror::Error)]
pub enum SupplierError {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response from {service}: {detail}")]
    UnexpectedResponse { service: &'static str, detail: String },
    #[error("{service} rejected the request: {detail}")]
    Rejected { service: &'static str, detail: String },
}

/// Turn a non-2xx response into an error carrying whatever body the
/// service sent, which is usually the only clue in supplier outages.
pub(crate) async fn require_success(
    response: reqwest::Response,
    service: &'static str,
) -> Result<reqwest::Response, SupplierError> {
    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(SupplierError::UnexpectedResponse {
            service,
            detail: format!("status {status}: {text}"),
        });
    }
    Ok(response)
}
