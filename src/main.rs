//! checkout-service - Main application entry point
//!
//! Serves the plan catalog and the checkout endpoints, backed by the billing
//! backend and Stripe.

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_service::config::Config;
use checkout_service::error::AppResult;
use checkout_service::handlers::configure_routes;
use checkout_service::middleware::{create_rate_limiter, create_rate_limiter_config};
use checkout_service::services::{
    BillingClient, CheckoutDeps, CheckoutRegistry, PlanCatalog, SessionStore, StripeClientService,
};

fn build_registry(config: &Config) -> AppResult<CheckoutRegistry> {
    let catalog = match &config.plan_catalog_path {
        Some(path) => PlanCatalog::load_from_file(path)?,
        None => {
            tracing::info!("PLAN_CATALOG_PATH not set - using built-in catalog");
            PlanCatalog::default()
        }
    };

    let billing = Arc::new(BillingClient::new(
        config.billing_api_url.clone(),
        config.billing_api_timeout(),
    )?);
    tracing::info!("Billing backend client configured for {}", config.billing_api_url);

    let stripe = Arc::new(StripeClientService::new(config.stripe_secret_key.clone()));
    tracing::info!("Stripe payment client configured");

    let deps = CheckoutDeps {
        promo: billing.clone(),
        tokenizer: stripe,
        creator: billing,
        sessions: SessionStore::new(),
        success_delay: config.success_delay(),
    };

    Ok(CheckoutRegistry::new(Arc::new(catalog), deps))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing subscriber for structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "checkout_service=info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Loading configuration...");

    // Load configuration from environment variables
    let config = Config::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let server_addr = config.server_addr();

    let registry = build_registry(&config).map_err(|e| {
        tracing::error!("Failed to initialize checkout services: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let registry = web::Data::new(registry);

    let rate_limit = create_rate_limiter_config(
        config.rate_limit_seconds_per_request,
        config.rate_limit_burst,
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    tracing::info!("Starting server at http://{}", server_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(registry.clone())
            // Request logging
            .wrap(Logger::default())
            // Distributed tracing
            .wrap(tracing_actix_web::TracingLogger::default())
            // Rate limiting (Governor is built per worker)
            .wrap(create_rate_limiter(&rate_limit))
            .configure(configure_routes)
    })
    .bind(&server_addr)?
    .run()
    .await
}
