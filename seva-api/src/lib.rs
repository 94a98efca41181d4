use axum::{
    http::Method,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod gateway;
pub mod offerings;
pub mod state;
pub mod webhooks;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/offerings", get(offerings::list_offerings))
        .route("/api/offerings/categories", get(offerings::categories))
        .route(
            "/api/offerings/subcategories/{parent}",
            get(offerings::subcategories),
        )
        .route(
            "/api/offerings/available/{date}",
            get(offerings::available_on_date),
        )
        .route("/api/stars", get(offerings::stars))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/{id}", get(bookings::get_booking))
        .route(
            "/api/bookings/payment-complete",
            post(bookings::payment_complete),
        )
        .route("/api/webhooks/cashfree", post(webhooks::cashfree_webhook))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route(
            "/api/admin/offerings/{id}/participants",
            get(admin::offering_participants),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(axum::extract::State(state): axum::extract::State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": format!("{} booking API", state.temple.name),
        "paymentGateway": if state.gateway_live { "cashfree" } else { "manual" },
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
