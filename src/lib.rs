//! checkout-service - subscription checkout orchestration
//!
//! Hosts one in-memory state machine per open checkout and drives it through
//! promo validation, card tokenization, subscription creation and session
//! reconciliation.
//!
//! # Modules
//!
//! - [`config`] - Application configuration from environment variables
//! - [`error`] - Unified error handling
//! - [`models`] - Plans, sessions and checkout state
//! - [`services`] - Catalog, billing and Stripe clients, orchestrator, registry
//! - [`handlers`] - HTTP route handlers
//! - [`middleware`] - Rate limiting middleware
//!
//! # Quick Start
//!
//! ```ignore
//! use checkout_service::{Config, CheckoutRegistry, PlanCatalog};
//! use checkout_service::handlers::configure_routes;
//! use checkout_service::middleware::create_rate_limiter;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

// Re-export commonly used types at the crate root
pub use config::{Config, ConfigError};
pub use error::{AppError, AppResult};
pub use models::{
    BillingPeriod, CheckoutPhase, CheckoutView, PricingTier, Session, SubscriptionResult,
};
pub use services::{
    BillingClient, CheckoutDeps, CheckoutError, CheckoutOrchestrator, CheckoutRegistry,
    PlanCatalog, SessionStore, StripeClientService,
};
