use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

/// Liveness probe. Lives outside the `/api` scope, so it is reachable without
/// a token, and answers with the same envelope as everything else.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "api working",
        "timestamp": Utc::now()
    }))
}
