use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "OmniCall API Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "companies": "/api/companies",
            "customers": "/api/customers",
        }
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
