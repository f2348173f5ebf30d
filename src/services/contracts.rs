//! Contracts for the collaborators the checkout orchestrator drives.
//!
//! Each external dependency sits behind a trait so the orchestrator can be
//! exercised with in-process fakes:
//! - [`PromoValidator`] - checks a promo code against a tier
//! - [`PaymentTokenizer`] - turns card input into a single-use payment method
//! - [`SubscriptionCreator`] - asks the billing backend to create the subscription

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    BillingDetails, BillingPeriod, CardInput, PaymentMethodRef, PromoOutcome, SubscriptionResult,
};

/// Failure while validating a promo code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromoValidationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed promo response: {0}")]
    InvalidResponse(String),
}

/// Failure while tokenizing card input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// Declined or invalid card
    #[error("Card error: {reason}")]
    Card { reason: String },

    /// Gateway could not be reached
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),
}

/// Failure while creating a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateSubscriptionError {
    /// Backend rejected the request on a business rule
    #[error("Billing error: {message}")]
    Billing {
        code: Option<String>,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),
}

/// Checks promo codes with the billing backend.
#[async_trait]
pub trait PromoValidator: Send + Sync {
    /// Validate `code` for the tier named `plan`.
    ///
    /// A rejected code is a successful call returning `valid: false`.
    async fn validate(&self, code: &str, plan: &str) -> Result<PromoOutcome, PromoValidationError>;
}

/// Converts raw card input into a payment method reference.
#[async_trait]
pub trait PaymentTokenizer: Send + Sync {
    /// Tokenize `card` with `billing` attached. The card is consumed.
    async fn tokenize(
        &self,
        card: CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentMethodRef, TokenizeError>;
}

/// Creates or upgrades a subscription with the billing backend.
#[async_trait]
pub trait SubscriptionCreator: Send + Sync {
    async fn create_subscription(
        &self,
        payment_method: &PaymentMethodRef,
        plan: &str,
        billing_period: BillingPeriod,
        promo_code: Option<&str>,
    ) -> Result<SubscriptionResult, CreateSubscriptionError>;
}
