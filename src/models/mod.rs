//! Data models for the checkout service.
//!
//! - [`PricingTier`] / [`BillingPeriod`] - catalog entries and billing cadence
//! - [`Session`] - visitor session with identity and subscription fields
//! - [`CheckoutSession`] - state owned by one open checkout

pub mod checkout;
pub mod plan;
pub mod session;

pub use checkout::{
    display_price, BillingDetails, CardInput, CheckoutPhase, CheckoutSession, CheckoutView,
    PaymentMethodRef, PromoOutcome, SubscriptionResult, SUCCESS_MESSAGE,
};
pub use plan::{BillingPeriod, Feature, PricingTier};
pub use session::{Identity, Session, SubscriptionInfo};
