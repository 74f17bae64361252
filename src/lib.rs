pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::state::AppState;

/// Build the complete HTTP surface over the given state.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut router = Router::new()
        .merge(public_routes())
        .merge(survey_routes())
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

// Each method router falls back to the JSON 404 as well, so a known path
// with an unhandled method is reported like any other unmatched route.
fn public_routes() -> Router<AppState> {
    use handlers::public::{health, users};

    Router::new()
        .route("/health", get(health::get).fallback(handlers::not_found))
        // Token acquisition
        .route("/users", post(users::signup).fallback(handlers::not_found))
        .route("/signup", post(users::signup).fallback(handlers::not_found))
        .route("/login", post(users::login).fallback(handlers::not_found))
}

fn survey_routes() -> Router<AppState> {
    use handlers::{protected, public};

    Router::new()
        .route(
            "/surveys",
            get(public::surveys::list)
                .post(protected::surveys::create)
                .fallback(handlers::not_found),
        )
        .route(
            "/surveys/:id",
            get(public::surveys::detail)
                .patch(protected::surveys::update)
                .delete(protected::surveys::delete)
                .fallback(handlers::not_found),
        )
        .route(
            "/surveys/:id/questions",
            post(protected::surveys::create_question).fallback(handlers::not_found),
        )
        .route(
            "/questions/:id/choices",
            get(public::surveys::choices).fallback(handlers::not_found),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
