use serde::Deserialize;
use thiserror::Error;

/// Payment state of a checkout session as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    NoPaymentRequired,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub id: String,
    pub payment_status: PaymentStatus,
    pub payment_intent_id: Option<String>,
}

/// Checkout session ids are ASCII alphanumerics and underscores, at most 255
/// characters. Anything else would alter the provider's request path.
pub fn is_well_formed_session_id(session_id: &str) -> bool {
    !session_id.is_empty()
        && session_id.len() <= 255
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider does not recognise the session id, or it is malformed.
    #[error("{0}")]
    InvalidSession(String),
    /// The provider could not be reached or answered with a server fault.
    #[error("{0}")]
    Unavailable(String),
}
