use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("payment provider rejected the invoice request: {0}")]
    Provider(String),
}

/// Parameters forwarded to the external payment provider. Success is
/// observed only through a later `PaymentSucceeded` inbound event, which
/// carries nothing but the user id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceRequest {
    pub user_id: UserId,
    pub title: String,
    pub amount: i64,
    pub description: String,
}

/// Fire-and-forget invoice issuance. The concrete implementation lives
/// with the chat transport binding; the engine only needs this surface.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn request_invoice(&self, request: InvoiceRequest) -> Result<(), PaymentError>;
}

/// Accepts every invoice request without doing anything. Stands in for a
/// real provider binding when the process runs without one.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPaymentGateway;

#[async_trait]
impl PaymentGateway for NoopPaymentGateway {
    async fn request_invoice(&self, _request: InvoiceRequest) -> Result<(), PaymentError> {
        Ok(())
    }
}
