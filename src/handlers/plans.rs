//! Plan catalog endpoint.

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::PricingTier;
use crate::services::CheckoutRegistry;

/// Response for listing pricing tiers
#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub plans: Vec<PricingTier>,
}

/// List the pricing tiers in display order.
///
/// GET /api/plans
pub async fn list_plans(registry: web::Data<CheckoutRegistry>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(PlansResponse {
        plans: registry.catalog().list_tiers().to_vec(),
    }))
}
