//! Checkout handlers.
//!
//! This module provides the following endpoints:
//! - `POST /api/checkout` - Open a checkout for a plan
//! - `GET /api/checkout/{id}` - Current checkout view
//! - `PUT /api/checkout/{id}/billing-period` - Switch monthly/yearly billing
//! - `POST /api/checkout/{id}/promo` - Validate and apply a promo code
//! - `POST /api/checkout/{id}/submit` - Tokenize the card and create the subscription
//! - `DELETE /api/checkout/{id}` - Dismiss the checkout

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{BillingPeriod, CardInput};
use crate::services::CheckoutRegistry;

/// Request to open a checkout
#[derive(Debug, Deserialize)]
pub struct OpenCheckoutRequest {
    pub visitor_id: Uuid,
    /// Tier name from the plan catalog
    pub plan: String,
}

#[derive(Debug, Deserialize)]
pub struct BillingPeriodRequest {
    pub billing_period: BillingPeriod,
}

#[derive(Debug, Deserialize)]
pub struct PromoRequest {
    pub code: String,
}

/// Request to submit a checkout
#[derive(Debug, Deserialize)]
pub struct SubmitCheckoutRequest {
    pub name: String,
    pub email: String,
    pub card: CardInput,
}

/// POST /api/checkout
pub async fn open_checkout(
    registry: web::Data<CheckoutRegistry>,
    req: web::Json<OpenCheckoutRequest>,
) -> AppResult<HttpResponse> {
    let checkout = registry.open(req.visitor_id, &req.plan)?;
    Ok(HttpResponse::Created().json(checkout.view()))
}

/// GET /api/checkout/{id}
pub async fn get_checkout(
    registry: web::Data<CheckoutRegistry>,
    checkout_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let checkout = registry.get(checkout_id.into_inner())?;
    Ok(HttpResponse::Ok().json(checkout.view()))
}

/// PUT /api/checkout/{id}/billing-period
pub async fn set_billing_period(
    registry: web::Data<CheckoutRegistry>,
    checkout_id: web::Path<Uuid>,
    req: web::Json<BillingPeriodRequest>,
) -> AppResult<HttpResponse> {
    let checkout = registry.get(checkout_id.into_inner())?;
    let view = checkout.set_billing_period(req.billing_period)?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/checkout/{id}/promo
pub async fn apply_promo(
    registry: web::Data<CheckoutRegistry>,
    checkout_id: web::Path<Uuid>,
    req: web::Json<PromoRequest>,
) -> AppResult<HttpResponse> {
    let checkout = registry.get(checkout_id.into_inner())?;
    let view = checkout.apply_promo(&req.code).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/checkout/{id}/submit
pub async fn submit_checkout(
    registry: web::Data<CheckoutRegistry>,
    checkout_id: web::Path<Uuid>,
    req: web::Json<SubmitCheckoutRequest>,
) -> AppResult<HttpResponse> {
    let checkout = registry.get(checkout_id.into_inner())?;
    let SubmitCheckoutRequest { name, email, card } = req.into_inner();
    let view = checkout.submit(&name, &email, card).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// DELETE /api/checkout/{id}
pub async fn dismiss_checkout(
    registry: web::Data<CheckoutRegistry>,
    checkout_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    registry.dismiss(checkout_id.into_inner())?;
    Ok(HttpResponse::NoContent().finish())
}
