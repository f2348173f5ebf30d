//! Stripe payment gateway client.
//!
//! Wraps the Stripe SDK client and turns raw card input into a single-use
//! PaymentMethod with the submitter's billing details attached.

use async_trait::async_trait;
use stripe::{
    BillingDetails as StripeBillingDetails, CardDetailsParams, Client, CreatePaymentMethod,
    CreatePaymentMethodCardUnion, PaymentMethod, PaymentMethodTypeFilter, StripeError,
};

use super::contracts::{PaymentTokenizer, TokenizeError};
use crate::models::{BillingDetails, CardInput, PaymentMethodRef};

/// Stripe client service for tokenizing cards
#[derive(Clone)]
pub struct StripeClientService {
    client: Client,
}

impl StripeClientService {
    /// Create a new Stripe client service with the provided API key
    pub fn new(api_key: String) -> Self {
        let client = Client::new(api_key);
        Self { client }
    }

    /// Get a reference to the underlying Stripe client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Map a Stripe request failure onto the tokenizer taxonomy.
///
/// 4xx responses are card problems; the decline code is preferred as the
/// reason, then the Stripe message. Anything else means the gateway is down.
pub fn classify_stripe_failure(
    http_status: u16,
    decline_code: Option<&str>,
    message: Option<&str>,
) -> TokenizeError {
    if (400..500).contains(&http_status) && http_status != 401 && http_status != 429 {
        let reason = decline_code
            .or(message)
            .unwrap_or("card was rejected")
            .to_string();
        TokenizeError::Card { reason }
    } else {
        TokenizeError::GatewayUnavailable(format!("Stripe returned status {}", http_status))
    }
}

impl From<StripeError> for TokenizeError {
    fn from(err: StripeError) -> Self {
        match err {
            StripeError::Stripe(request) => classify_stripe_failure(
                request.http_status,
                request.decline_code.as_deref(),
                request.message.as_deref(),
            ),
            other => TokenizeError::GatewayUnavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl PaymentTokenizer for StripeClientService {
    async fn tokenize(
        &self,
        card: CardInput,
        billing: &BillingDetails,
    ) -> Result<PaymentMethodRef, TokenizeError> {
        let last4 = card.last4();

        let mut params = CreatePaymentMethod::new();
        params.type_ = Some(PaymentMethodTypeFilter::Card);
        params.card = Some(CreatePaymentMethodCardUnion::CardDetailsParams(
            CardDetailsParams {
                number: card.number,
                exp_month: card.exp_month,
                exp_year: card.exp_year,
                cvc: Some(card.cvc),
            },
        ));
        params.billing_details = Some(StripeBillingDetails {
            name: Some(billing.name.clone()),
            email: Some(billing.email.clone()),
            ..Default::default()
        });

        let payment_method = PaymentMethod::create(&self.client, params)
            .await
            .map_err(|e| {
                tracing::warn!(last4 = %last4, "Stripe payment method creation failed: {}", e);
                TokenizeError::from(e)
            })?;

        tracing::info!(
            payment_method = %payment_method.id,
            last4 = %last4,
            "Created Stripe payment method"
        );

        Ok(PaymentMethodRef(payment_method.id.to_string()))
    }
}
