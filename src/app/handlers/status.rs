//! `GET /status`.

use actix_web::{get, HttpResponse};
use serde_json::json;

#[get("/status")]
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
