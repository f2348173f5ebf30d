//! HTTP handlers for the checkout service.
//!
//! - `health` - Health check endpoint
//! - `plans` - Plan catalog
//! - `checkout` - Checkout lifecycle (open, promo, submit, dismiss)
//! - `session` - Visitor session snapshots

pub mod checkout;
pub mod health;
pub mod plans;
pub mod session;

use actix_web::web;

// Re-export commonly used types
pub use checkout::{
    apply_promo, dismiss_checkout, get_checkout, open_checkout, set_billing_period,
    submit_checkout, BillingPeriodRequest, OpenCheckoutRequest, PromoRequest,
    SubmitCheckoutRequest,
};
pub use health::{health_check, HealthResponse};
pub use plans::{list_plans, PlansResponse};
pub use session::get_session;

/// Register every route. Shared by the server and the handler tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api")
            .route("/plans", web::get().to(list_plans))
            .route("/sessions/{visitor_id}", web::get().to(get_session))
            .service(
                web::scope("/checkout")
                    .route("", web::post().to(open_checkout))
                    .route("/{id}", web::get().to(get_checkout))
                    .route("/{id}", web::delete().to(dismiss_checkout))
                    .route("/{id}/billing-period", web::put().to(set_billing_period))
                    .route("/{id}/promo", web::post().to(apply_promo))
                    .route("/{id}/submit", web::post().to(submit_checkout)),
            ),
    );
}
