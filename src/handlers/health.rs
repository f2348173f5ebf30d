//! Health check endpoint for the API.

use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::services::CheckoutRegistry;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// The status of the service
    pub status: String,
    /// Checkouts currently held in memory
    pub open_checkouts: usize,
}

/// Liveness check.
///
/// ```ignore
/// GET /health
/// Response: {"status": "healthy", "open_checkouts": 0}
/// ```
pub async fn health_check(registry: web::Data<CheckoutRegistry>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        open_checkouts: registry.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            open_checkouts: 2,
        };
        let json = serde_json::to_string(&response).expect("Failed to serialize");
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"open_checkouts\":2"));
    }
}
