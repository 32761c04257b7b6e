mod auth;
mod categories;
pub mod error;
mod ingredients;
mod recipes;
mod suppliers;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::session;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes: refresh/logout/profile require a live session,
    // register/login are public
    let auth_routes = Router::new()
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_auth,
        ))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Protected API routes
    let api_routes = Router::new()
        // Categories
        .route("/categories", get(categories::list_categories))
        .route("/categories", post(categories::create_category))
        .route("/categories/:id", get(categories::get_category))
        .route("/categories/:id", put(categories::update_category))
        .route("/categories/:id", delete(categories::delete_category))
        // Suppliers
        .route("/suppliers", get(suppliers::list_suppliers))
        .route("/suppliers", post(suppliers::create_supplier))
        .route("/suppliers/:id", get(suppliers::get_supplier))
        .route("/suppliers/:id", put(suppliers::update_supplier))
        .route("/suppliers/:id", delete(suppliers::delete_supplier))
        // Ingredients
        .route("/ingredients", get(ingredients::list_ingredients))
        .route("/ingredients", post(ingredients::create_ingredient))
        .route("/ingredients/stats", get(ingredients::ingredient_stats))
        .route("/ingredients/alerts", get(ingredients::stock_alerts))
        .route("/ingredients/:id", get(ingredients::get_ingredient))
        .route("/ingredients/:id", put(ingredients::update_ingredient))
        .route("/ingredients/:id", delete(ingredients::delete_ingredient))
        .route("/ingredients/:id/stock", patch(ingredients::update_stock))
        // Recipes
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes", post(recipes::create_recipe))
        .route("/recipes/:id", get(recipes::get_recipe))
        .route("/recipes/:id", put(recipes::update_recipe))
        .route("/recipes/:id", delete(recipes::delete_recipe))
        .route("/recipes/:id/cost", get(recipes::recipe_cost))
        // Protected by the session cookie
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_auth,
        ));

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes);

    if !state.config.cors.allowed_origins.is_empty() {
        router = router.layer(cors_layer(&state.config.cors.allowed_origins));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

/// CORS for the configured frontend origins; credentials are allowed so the
/// session cookie travels cross-origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> &'static str {
    "OK"
}
