//! Checkout session lookups against the Stripe REST API.
//!
//! Only `GET /v1/checkout/sessions/{id}` is used. Stripe answers unknown ids
//! with 404 (`resource_missing`) and malformed ones with 400; both surface as
//! [`PaymentError::InvalidSession`]. Anything else that is not a success is
//! treated as the provider being unavailable.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::payment::{
    is_well_formed_session_id, PaymentError, PaymentSession, PaymentStatus,
};
use crate::domain::ports::PaymentSessionGateway;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Debug, Deserialize)]
struct CheckoutSessionBody {
    id: String,
    payment_status: PaymentStatus,
    payment_intent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

pub struct StripeSessionGateway {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl StripeSessionGateway {
    pub fn new(api_base: &str, secret_key: &str) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        })
    }
}

impl PaymentSessionGateway for StripeSessionGateway {
    fn fetch_session(&self, session_id: &str) -> Result<PaymentSession, PaymentError> {
        if !is_well_formed_session_id(session_id) {
            return Err(PaymentError::InvalidSession(format!(
                "malformed checkout session id '{}'",
                session_id
            )));
        }

        let url = format!("{}/v1/checkout/sessions/{}", self.api_base, session_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let body: CheckoutSessionBody = resp
                .json()
                .map_err(|e| PaymentError::Unavailable(format!("unreadable session: {}", e)))?;
            return Ok(PaymentSession {
                id: body.id,
                payment_status: body.payment_status,
                payment_intent_id: body.payment_intent,
            });
        }

        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            let message = resp
                .json::<StripeErrorBody>()
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| format!("No such checkout session: '{}'", session_id));
            log::debug!("Stripe rejected session {}: {}", session_id, message);
            return Err(PaymentError::InvalidSession(message));
        }

        log::warn!("Stripe returned {} for session {}", status, session_id);
        Err(PaymentError::Unavailable(format!(
            "Stripe returned {}",
            status
        )))
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn gateway(server: &MockServer) -> StripeSessionGateway {
        StripeSessionGateway::new(&server.base_url(), "sk_test_123").expect("client")
    }

    #[test]
    fn paid_session_is_parsed() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/checkout/sessions/cs_test_paid")
                .header("authorization", "Bearer sk_test_123");
            then.status(200).json_body(json!({
                "id": "cs_test_paid",
                "object": "checkout.session",
                "payment_status": "paid",
                "payment_intent": "pi_123",
                "status": "complete"
            }));
        });

        let session = gateway(&server)
            .fetch_session("cs_test_paid")
            .expect("fetch failed");

        mock.assert();
        assert_eq!(session.id, "cs_test_paid");
        assert_eq!(session.payment_status, PaymentStatus::Paid);
        assert_eq!(session.payment_intent_id.as_deref(), Some("pi_123"));
    }

    #[test]
    fn unpaid_session_without_intent_is_parsed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_test_open");
            then.status(200).json_body(json!({
                "id": "cs_test_open",
                "payment_status": "unpaid",
                "payment_intent": null
            }));
        });

        let session = gateway(&server)
            .fetch_session("cs_test_open")
            .expect("fetch failed");

        assert_eq!(session.payment_status, PaymentStatus::Unpaid);
        assert!(session.payment_intent_id.is_none());
    }

    #[test]
    fn unrecognised_payment_status_maps_to_unknown() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_test_new");
            then.status(200).json_body(json!({
                "id": "cs_test_new",
                "payment_status": "something_new"
            }));
        });

        let session = gateway(&server)
            .fetch_session("cs_test_new")
            .expect("fetch failed");

        assert_eq!(session.payment_status, PaymentStatus::Unknown);
    }

    #[test]
    fn missing_session_is_invalid() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_missing");
            then.status(404).json_body(json!({
                "error": {
                    "code": "resource_missing",
                    "message": "No such checkout.session: 'cs_missing'",
                    "type": "invalid_request_error"
                }
            }));
        });

        let err = gateway(&server)
            .fetch_session("cs_missing")
            .expect_err("should fail");

        match err {
            PaymentError::InvalidSession(msg) => assert!(msg.contains("cs_missing")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn malformed_id_is_rejected_without_a_request() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(200);
        });

        let err = gateway(&server)
            .fetch_session("../customers")
            .expect_err("should fail");

        assert!(matches!(err, PaymentError::InvalidSession(_)));
        mock.assert_hits(0);
    }

    #[test]
    fn server_error_is_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v1/checkout/sessions/cs_test_1");
            then.status(503);
        });

        let err = gateway(&server)
            .fetch_session("cs_test_1")
            .expect_err("should fail");

        assert!(matches!(err, PaymentError::Unavailable(_)));
    }

    #[test]
    fn unreachable_provider_is_unavailable() {
        let gateway = StripeSessionGateway::new("http://127.0.0.1:1", "sk_test_123").expect("client");

        let err = gateway.fetch_session("cs_test_1").expect_err("should fail");

        assert!(matches!(err, PaymentError::Unavailable(_)));
    }
}
