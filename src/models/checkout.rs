//! Checkout session model.
//!
//! A `CheckoutSession` is the state owned by one open checkout: the selected
//! tier, the billing period, an optional applied promo code, the submitter's
//! contact details and the current phase of the checkout state machine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::plan::{BillingPeriod, PricingTier};
use super::session::Identity;

/// Message shown once a subscription has been created.
pub const SUCCESS_MESSAGE: &str = "Subscription successful! You will be redirected shortly.";

/// Phase of the checkout state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutPhase {
    /// Waiting for user input
    Idle,
    /// A promo code is being checked with the billing backend
    ValidatingPromo,
    /// Tokenize / create subscription / reconcile is running
    Submitting,
    /// Subscription created and merged into the session
    Success,
    /// The last submission failed; behaves like `Idle` with an error attached
    Failed,
    /// Dismissed or auto-closed after success
    Closed,
}

impl CheckoutPhase {
    /// Returns the string representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutPhase::Idle => "idle",
            CheckoutPhase::ValidatingPromo => "validating_promo",
            CheckoutPhase::Submitting => "submitting",
            CheckoutPhase::Success => "success",
            CheckoutPhase::Failed => "failed",
            CheckoutPhase::Closed => "closed",
        }
    }

    /// True for phases that accept new user input (promo, submit, period change).
    pub fn accepts_input(&self) -> bool {
        matches!(self, CheckoutPhase::Idle | CheckoutPhase::Failed)
    }

    /// True once the checkout can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(self, CheckoutPhase::Success | CheckoutPhase::Closed)
    }
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of validating a promo code against a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoOutcome {
    /// Code exactly as submitted (case-sensitive)
    pub code: String,

    /// Whether the backend accepted the code
    pub valid: bool,

    /// Discounted price; present iff `valid`
    pub discounted_price: Option<String>,
}

/// Name and email attached to the payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BillingDetails {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email"))]
    pub email: String,
}

/// Raw card input as entered by the visitor.
///
/// Passed by value to the tokenizer and dropped afterwards. It is never
/// stored on a checkout session and its `Debug` output is redacted.
#[derive(Clone, Deserialize)]
pub struct CardInput {
    pub number: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub cvc: String,
}

impl CardInput {
    /// Last four digits of the card number, for logs and receipts.
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.number.chars().filter(|c| c.is_ascii_digit()).collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }
}

impl std::fmt::Debug for CardInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardInput")
            .field("last4", &self.last4())
            .field("number", &"[REDACTED]")
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

/// Opaque single-use payment method reference returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodRef(pub String);

impl PaymentMethodRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaymentMethodRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscription returned by the billing backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResult {
    pub tier: String,
    pub billing_period: BillingPeriod,
    pub effective_date: String,
}

/// Computes the price shown on the submit button.
///
/// An applied promo replaces the tier price for the current period. Pure:
/// the same inputs always produce the same string.
pub fn display_price(
    tier: &PricingTier,
    period: BillingPeriod,
    promo: Option<&PromoOutcome>,
) -> String {
    match promo.and_then(|p| p.discounted_price.as_deref()) {
        Some(discounted) => format!("{}{}", discounted, period.price_suffix()),
        None => tier.display_price(period),
    }
}

/// State owned by one open checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub tier: PricingTier,
    pub billing_period: BillingPeriod,
    pub applied_promo: Option<PromoOutcome>,
    pub name: String,
    pub email: String,
    pub phase: CheckoutPhase,
    pub error: Option<String>,
    pub payment_method: Option<PaymentMethodRef>,
    pub result: Option<SubscriptionResult>,
}

impl CheckoutSession {
    /// Opens a checkout for `tier`, pre-filling contact details from the
    /// visitor's identity when they are signed in.
    pub fn new(id: Uuid, visitor_id: Uuid, tier: PricingTier, identity: Option<&Identity>) -> Self {
        Self {
            id,
            visitor_id,
            tier,
            billing_period: BillingPeriod::Monthly,
            applied_promo: None,
            name: identity.map(|i| i.name.clone()).unwrap_or_default(),
            email: identity.map(|i| i.email.clone()).unwrap_or_default(),
            phase: CheckoutPhase::Idle,
            error: None,
            payment_method: None,
            result: None,
        }
    }

    pub fn displayed_price(&self) -> String {
        display_price(&self.tier, self.billing_period, self.applied_promo.as_ref())
    }

    /// Snapshot for callers outside the orchestrator.
    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            id: self.id,
            visitor_id: self.visitor_id,
            plan: self.tier.name.clone(),
            billing_period: self.billing_period,
            phase: self.phase,
            displayed_price: self.displayed_price(),
            applied_promo: self.applied_promo.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            error: self.error.clone(),
            success_message: (self.phase == CheckoutPhase::Success)
                .then(|| SUCCESS_MESSAGE.to_string()),
            result: self.result.clone(),
        }
    }
}

/// Read-only snapshot of a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutView {
    pub id: Uuid,
    pub visitor_id: Uuid,
    pub plan: String,
    pub billing_period: BillingPeriod,
    pub phase: CheckoutPhase,
    pub displayed_price: String,
    pub applied_promo: Option<PromoOutcome>,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
    pub success_message: Option<String>,
    pub result: Option<SubscriptionResult>,
}
