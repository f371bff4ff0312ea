//! # forum_api
//!
//! HTTP API library for the forum.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use forum_core::auth::store::UserStore;
use forum_core::views::ViewDeduper;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{account, admin, auth, categories, health, messages, topics};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// User lookups for authentication. Backed by `pool` in production.
    pub users: Arc<dyn UserStore>,
    /// Per-client topic view deduplication.
    pub views: Arc<ViewDeduper>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        Self {
            users: Arc::new(pool.clone()),
            pool,
            views: Arc::new(ViewDeduper::new()),
            config,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `forum_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    forum_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_HEALTH, get(health::health_handler))
        .route(routes::POST_AUTH_LOGIN, post(auth::login_handler))
        .route(routes::POST_AUTH_REGISTER, post(auth::register_handler))
        .route(routes::POST_AUTH_LOGOUT, post(auth::logout_handler))
        .route(routes::GET_CATEGORIES, get(categories::list_categories_handler))
        .route(routes::TOPICS, get(topics::list_topics_handler))
        .route(routes::TOPICS_ID, get(topics::get_topic_handler))
        .route(routes::POST_TOPICS_ID_VIEW, post(topics::record_view_handler))
        .route(routes::TOPICS_ID_REPLIES, get(topics::list_replies_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_AUTH_ME, get(auth::me_handler))
        .route(routes::TOPICS, post(topics::create_topic_handler))
        .route(routes::TOPICS_ID_REPLIES, post(topics::create_reply_handler))
        .route(routes::GET_USERS, get(account::list_users_handler))
        .route(
            routes::MESSAGES,
            get(messages::list_messages_handler).post(messages::send_message_handler),
        )
        .route(
            routes::POST_MESSAGES_MARK_READ,
            post(messages::mark_read_handler),
        )
        .route(routes::GET_USER_STATS, get(account::user_stats_handler))
        .route(routes::GET_USER_TOPICS, get(account::user_topics_handler))
        .route(routes::GET_USER_REPLIES, get(account::user_replies_handler))
        .route(
            routes::PATCH_USER_PROFILE,
            patch(account::update_profile_handler),
        )
        .route(
            routes::PATCH_USER_PASSWORD,
            patch(account::change_password_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Admin routes (auth runs first, then the role check)
    let admin = Router::new()
        .route(routes::GET_ADMIN_STATS, get(admin::stats_handler))
        .route(
            routes::GET_ADMIN_RECENT_USERS,
            get(admin::recent_users_handler),
        )
        .route(
            routes::GET_ADMIN_RECENT_TOPICS,
            get(admin::recent_topics_handler),
        )
        .route(routes::GET_ADMIN_USERS, get(admin::list_users_handler))
        .route(
            routes::PATCH_ADMIN_USERS_ID_ROLE,
            patch(admin::change_role_handler),
        )
        .route(
            routes::DELETE_ADMIN_USERS_ID,
            delete(admin::delete_user_handler),
        )
        .route(routes::GET_ADMIN_TOPICS, get(admin::list_topics_handler))
        .route(
            routes::DELETE_ADMIN_TOPICS_ID,
            delete(admin::delete_topic_handler),
        )
        .route(
            routes::ADMIN_CATEGORIES,
            get(admin::list_categories_handler).post(admin::create_category_handler),
        )
        .route(
            routes::ADMIN_CATEGORIES_ID,
            patch(admin::rename_category_handler).delete(admin::delete_category_handler),
        )
        .layer(axum::middleware::from_fn(middleware::auth::require_admin))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
