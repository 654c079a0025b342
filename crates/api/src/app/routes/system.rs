use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

pub async fn home() -> Json<Value> {
    Json(json!({ "home": "Hello world" }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
