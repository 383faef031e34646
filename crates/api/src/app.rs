use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::ports::{BathroomStore, IdentityProvider, UserStore};
use domain::services::{BathroomService, FavoritesLedger, RecommendationService, ReviewService};
use shared::jwt::{JwtError, SessionTokenConfig};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, security_headers_middleware, trace_id,
};
use crate::routes::{auth, bathrooms, favorites, health, recommendations, reviews};
use crate::services::SessionCookie;

#[derive(Clone)]
pub struct AppState {
    pub bathrooms: BathroomService,
    pub reviews: ReviewService,
    pub recommendations: RecommendationService,
    pub favorites: FavoritesLedger,
    pub users: Arc<dyn UserStore>,
    pub store: Arc<dyn BathroomStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: Arc<SessionTokenConfig>,
    pub cookie: SessionCookie,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the domain services over the given stores.
    ///
    /// Fails only when the session secret cannot be turned into a key.
    pub fn new(
        config: Config,
        store: Arc<dyn BathroomStore>,
        users: Arc<dyn UserStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, JwtError> {
        let sessions = SessionTokenConfig::with_leeway(
            &config.session.secret,
            config.session.expiry_secs,
            config.session.leeway_secs,
        )?;

        Ok(Self {
            bathrooms: BathroomService::new(store.clone()),
            reviews: ReviewService::new(store.clone()),
            recommendations: RecommendationService::new(store.clone()),
            favorites: FavoritesLedger::new(users.clone()),
            users,
            store,
            identity,
            sessions: Arc::new(sessions),
            cookie: SessionCookie::from_config(&config.session),
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Credentialed requests need explicit origins
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
            ])
            .allow_credentials(true)
    };

    // Static segments win over `:id`, so the named bathroom routes coexist
    // with the detail route.
    let bathroom_routes = Router::new()
        .route("/api/bathrooms", get(bathrooms::list_bathrooms))
        .route("/api/bathrooms/full", get(bathrooms::list_bathrooms_full))
        .route("/api/bathrooms/add", post(bathrooms::add_bathroom))
        .route(
            "/api/bathrooms/recommendations",
            get(recommendations::get_recommendations),
        )
        .route("/api/bathrooms/:id", get(bathrooms::get_bathroom))
        .route(
            "/api/bathrooms/:id/reviews",
            get(reviews::list_reviews)
                .post(reviews::submit_review)
                .delete(reviews::delete_review),
        )
        .route("/api/bathrooms/:id/images", post(bathrooms::add_image));

    // Session-bound routes. Handlers resolve the caller themselves so that
    // identifier and existence checks can run first.
    let user_routes = Router::new()
        .route("/api/my-reviews", get(reviews::my_reviews))
        .route("/api/users/favorites", get(favorites::list_favorites))
        .route(
            "/api/users/favorites/:id",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        );

    let auth_routes = Router::new()
        .route("/api/auth/google", post(auth::google_login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(bathroom_routes)
        .merge(user_routes)
        .merge(auth_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
