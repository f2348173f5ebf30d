//! Billing backend API client.
//!
//! Talks JSON to the billing backend for promo validation and subscription
//! creation, and implements the [`PromoValidator`] and [`SubscriptionCreator`]
//! contracts on top of it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::contracts::{
    CreateSubscriptionError, PromoValidationError, PromoValidator, SubscriptionCreator,
};
use crate::models::{BillingPeriod, PaymentMethodRef, PromoOutcome, SubscriptionResult};

#[derive(Debug, Error)]
pub enum BillingApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {message} (status: {status})")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Non-2xx response without a readable error body
    #[error("Billing backend returned status {0}")]
    Status(u16),

    #[error("Invalid response from billing backend: {0}")]
    InvalidResponse(String),
}

/// Billing backend client
#[derive(Clone)]
pub struct BillingClient {
    client: Client,
    base_url: String,
}

// Request types

#[derive(Debug, Serialize)]
pub struct ValidatePromoRequest<'a> {
    pub code: &'a str,
    pub plan: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest<'a> {
    pub payment_method_id: &'a str,
    pub plan: &'a str,
    pub billing_period: BillingPeriod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<&'a str>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatePromoResponse {
    pub valid: bool,
    pub discounted_price: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
    code: Option<String>,
}

/// The backend may report a business error with a 2xx status.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateSubscriptionReply {
    Created(SubscriptionResult),
    Rejected(ApiErrorResponse),
}

impl BillingClient {
    /// Create a new billing client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BillingApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Make a POST request to the billing backend
    async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BillingApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return match response.json::<ApiErrorResponse>().await {
                Ok(error_body) => Err(BillingApiError::Api {
                    status,
                    code: error_body.code,
                    message: error_body.error,
                }),
                Err(_) => Err(BillingApiError::Status(status)),
            };
        }

        response.json().await.map_err(|e| {
            tracing::error!("Failed to parse billing response: {}", e);
            BillingApiError::InvalidResponse(e.to_string())
        })
    }

    /// Ask the backend whether `code` applies to `plan`.
    pub async fn validate_promo(
        &self,
        code: &str,
        plan: &str,
    ) -> Result<ValidatePromoResponse, BillingApiError> {
        tracing::debug!(plan, "Validating promo code");
        self.post("/validate-promo", &ValidatePromoRequest { code, plan })
            .await
    }

    /// Create or upgrade a subscription.
    pub async fn create(
        &self,
        request: &CreateSubscriptionRequest<'_>,
    ) -> Result<SubscriptionResult, BillingApiError> {
        tracing::info!(
            plan = request.plan,
            billing_period = %request.billing_period,
            with_promo = request.promo_code.is_some(),
            "Creating subscription"
        );

        match self.post("/create-subscription", request).await? {
            CreateSubscriptionReply::Created(result) => Ok(result),
            CreateSubscriptionReply::Rejected(body) => Err(BillingApiError::Api {
                status: 200,
                code: body.code,
                message: body.error,
            }),
        }
    }
}

impl From<BillingApiError> for CreateSubscriptionError {
    fn from(err: BillingApiError) -> Self {
        match err {
            BillingApiError::Api { code, message, .. } => {
                CreateSubscriptionError::Billing { code, message }
            }
            BillingApiError::Status(status) if status < 500 => CreateSubscriptionError::Billing {
                code: None,
                message: format!("Subscription request was rejected (status {})", status),
            },
            other => CreateSubscriptionError::Network(other.to_string()),
        }
    }
}

impl From<BillingApiError> for PromoValidationError {
    fn from(err: BillingApiError) -> Self {
        match err {
            BillingApiError::InvalidResponse(msg) => PromoValidationError::InvalidResponse(msg),
            other => PromoValidationError::Network(other.to_string()),
        }
    }
}

#[async_trait]
impl PromoValidator for BillingClient {
    async fn validate(&self, code: &str, plan: &str) -> Result<PromoOutcome, PromoValidationError> {
        let reply = self.validate_promo(code, plan).await?;

        match (reply.valid, reply.discounted_price) {
            (true, None) => Err(PromoValidationError::InvalidResponse(
                "valid promo without a discounted price".to_string(),
            )),
            (true, Some(price)) => Ok(PromoOutcome {
                code: code.to_string(),
                valid: true,
                discounted_price: Some(price),
            }),
            (false, _) => Ok(PromoOutcome {
                code: code.to_string(),
                valid: false,
                discounted_price: None,
            }),
        }
    }
}

#[async_trait]
impl SubscriptionCreator for BillingClient {
    async fn create_subscription(
        &self,
        payment_method: &PaymentMethodRef,
        plan: &str,
        billing_period: BillingPeriod,
        promo_code: Option<&str>,
    ) -> Result<SubscriptionResult, CreateSubscriptionError> {
        let request = CreateSubscriptionRequest {
            payment_method_id: payment_method.as_str(),
            plan,
            billing_period,
            promo_code,
        };
        Ok(self.create(&request).await?)
    }
}
