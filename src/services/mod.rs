//! Services module - checkout orchestration and external integrations.
//!
//! This module contains:
//! - `catalog`: Pricing tier catalog
//! - `contracts`: Traits for the promo validator, tokenizer and subscription creator
//! - `billing`: Billing backend client for promo validation and subscription creation
//! - `stripe_client`: Stripe card tokenization
//! - `reconciler`: Session merge and in-memory session store
//! - `orchestrator`: Checkout state machine
//! - `registry`: Open checkouts, one per visitor

pub mod billing;
pub mod catalog;
pub mod contracts;
pub mod orchestrator;
pub mod reconciler;
pub mod registry;
pub mod stripe_client;

// Re-export commonly used types for convenience
pub use billing::{BillingApiError, BillingClient};
pub use catalog::{CatalogError, PlanCatalog};
pub use contracts::{
    CreateSubscriptionError, PaymentTokenizer, PromoValidationError, PromoValidator,
    SubscriptionCreator, TokenizeError,
};
pub use orchestrator::{CheckoutDeps, CheckoutError, CheckoutOrchestrator, DEFAULT_SUCCESS_DELAY};
pub use reconciler::{apply_subscription, ReconcileError, SessionStore};
pub use registry::CheckoutRegistry;
pub use stripe_client::StripeClientService;
