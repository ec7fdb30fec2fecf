use axum::Json;

pub async fn health_check() -> Json<bool> {
    Json(true)
}
