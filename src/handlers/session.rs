//! Visitor session endpoint.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::CheckoutRegistry;

/// Snapshot of a visitor's session, including their current subscription.
///
/// GET /api/sessions/{visitor_id}
pub async fn get_session(
    registry: web::Data<CheckoutRegistry>,
    visitor_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let visitor_id = visitor_id.into_inner();
    let session = registry
        .sessions()
        .get(visitor_id)
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {}", visitor_id)))?;

    Ok(HttpResponse::Ok().json(session))
}
