//! Payment bridge: a thin adapter to the external payment processor.
//!
//! The processor holds all payment state; this side only opens an intent for
//! a server-computed amount and hands the client secret back to the caller.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use thiserror::Error;

pub const CURRENCY: &str = "bdt";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment processor rejected the request: {0}")]
    Processor(String),

    #[error("payment processor unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// An opened payment intent: the processor's transaction id plus the client
/// secret the front end needs to complete payment out of band.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// Metadata attached to the intent for reconciliation on the processor side.
#[derive(Debug, Clone)]
pub struct IntentMetadata {
    pub user_id: String,
    pub service_id: String,
    pub duration: i64,
}

pub type GatewayResult<T> = Result<T, PaymentError>;

/// Abstraction over the hosted payment processor.
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment intent for `amount_minor` (smallest currency unit).
    fn create_intent(
        &self,
        amount_minor: i64,
        metadata: IntentMetadata,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>>;
}

/// Stripe-backed gateway.
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
}

impl StripeGateway {
    pub fn new(secret_key: String) -> Self {
        StripeGateway {
            client: reqwest::Client::new(),
            secret_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntentResponse {
    id: String,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    message: Option<String>,
}

impl PaymentGateway for StripeGateway {
    fn create_intent(
        &self,
        amount_minor: i64,
        metadata: IntentMetadata,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>> {
        let client = self.client.clone();
        let secret_key = self.secret_key.clone();
        Box::pin(async move {
            let params = [
                ("amount", amount_minor.to_string()),
                ("currency", CURRENCY.to_string()),
                ("automatic_payment_methods[enabled]", "true".to_string()),
                ("metadata[userId]", metadata.user_id),
                ("metadata[serviceId]", metadata.service_id),
                ("metadata[duration]", metadata.duration.to_string()),
            ];

            let response = client
                .post("https://api.stripe.com/v1/payment_intents")
                .basic_auth(&secret_key, None::<&str>)
                .form(&params)
                .send()
                .await?;

            if !response.status().is_success() {
                let status = response.status();
                let message = response
                    .json::<StripeErrorResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.error.message)
                    .unwrap_or_else(|| format!("HTTP {status}"));
                return Err(PaymentError::Processor(message));
            }

            let intent: StripeIntentResponse = response.json().await?;
            let client_secret = intent
                .client_secret
                .ok_or_else(|| PaymentError::Processor("missing client_secret".to_string()))?;

            log::info!("Opened payment intent {} for {} {}", intent.id, amount_minor, CURRENCY);

            Ok(PaymentIntent {
                id: intent.id,
                client_secret,
            })
        })
    }
}

/// Always-succeeding gateway for development and tests.
pub struct MockGateway;

impl PaymentGateway for MockGateway {
    fn create_intent(
        &self,
        amount_minor: i64,
        _metadata: IntentMetadata,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>> {
        Box::pin(async move {
            let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
            Ok(PaymentIntent {
                client_secret: format!("{id}_secret_{amount_minor}"),
                id,
            })
        })
    }
}

/// Gateway used when no processor key is configured; every pay-now attempt
/// aborts with an upstream error and nothing is persisted.
pub struct DisabledGateway;

impl PaymentGateway for DisabledGateway {
    fn create_intent(
        &self,
        _amount_minor: i64,
        _metadata: IntentMetadata,
    ) -> Pin<Box<dyn Future<Output = GatewayResult<PaymentIntent>> + Send>> {
        Box::pin(async {
            Err(PaymentError::Processor(
                "payment processor is not configured".to_string(),
            ))
        })
    }
}
