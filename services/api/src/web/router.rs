//! services/api/src/web/router.rs
//!
//! Assembles the public and admin routers and holds the master definition
//! of the OpenAPI document.

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use utoipa::OpenApi;

use crate::web::{admin, auth, chat, mail, middleware::require_admin, public, state::AppState};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        public::submit_contact_handler,
        public::submit_feedback_handler,
        public::list_testimonials_handler,
        public::list_blog_handler,
        public::get_blog_post_handler,
        public::list_case_studies_handler,
        public::list_events_handler,
        mail::compose_handler,
        chat::open_chat_handler,
        chat::get_chat_handler,
        chat::send_message_handler,
        chat::close_chat_handler,
        chat::list_faq_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        admin::overview_handler,
        admin::update_contact_status_handler,
        admin::promote_testimonial_handler,
        admin::create_blog_post_handler,
    ),
    components(
        schemas(
            site_core::domain::ContactSubmission,
            site_core::domain::NewContactSubmission,
            site_core::domain::ContactStatus,
            site_core::domain::FeedbackSubmission,
            site_core::domain::NewFeedbackSubmission,
            site_core::domain::BlogPost,
            site_core::domain::NewBlogPost,
            site_core::domain::CaseStudy,
            site_core::domain::NewCaseStudy,
            site_core::domain::Event,
            site_core::domain::NewEvent,
            site_core::domain::OverviewStats,
            site_core::chat::ChatMessage,
            site_core::chat::Origin,
            chat::ChatTranscript,
            chat::SendMessageRequest,
            chat::ChatExchange,
            chat::FaqQuestion,
            auth::LoginRequest,
            auth::AuthResponse,
            admin::StatusUpdate,
        )
    ),
    tags(
        (name = "Site API", description = "Public site content, the FAQ chat and the admin dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Router
//=========================================================================================

fn cors_layer(allowed_origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);
    match allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            warn!("Ignoring invalid ALLOWED_ORIGIN '{}': {}", allowed_origin, e);
            cors
        }
    }
}

/// Builds the complete API router around the shared state.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(public::health_handler))
        .route("/contact", post(public::submit_contact_handler))
        .route("/contact/compose", get(mail::compose_handler))
        .route("/feedback", post(public::submit_feedback_handler))
        .route("/testimonials", get(public::list_testimonials_handler))
        .route("/blog", get(public::list_blog_handler))
        .route("/blog/{id}", get(public::get_blog_post_handler))
        .route("/case-studies", get(public::list_case_studies_handler))
        .route("/events", get(public::list_events_handler))
        .route("/faq", get(chat::list_faq_handler))
        .route("/chat", post(chat::open_chat_handler))
        .route(
            "/chat/{id}",
            get(chat::get_chat_handler).delete(chat::close_chat_handler),
        )
        .route("/chat/{id}/messages", post(chat::send_message_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (admin session required)
    let admin_routes = Router::new()
        .route("/auth/me", get(auth::me_handler))
        .route("/admin/overview", get(admin::overview_handler))
        .route("/admin/contacts", get(admin::list_contacts_handler))
        .route(
            "/admin/contacts/{id}",
            axum::routing::delete(admin::delete_contact_handler),
        )
        .route(
            "/admin/contacts/{id}/status",
            put(admin::update_contact_status_handler),
        )
        .route("/admin/feedback", get(admin::list_feedback_handler))
        .route(
            "/admin/feedback/{id}",
            axum::routing::delete(admin::delete_feedback_handler),
        )
        .route(
            "/admin/testimonials/candidates",
            get(admin::testimonial_candidates_handler),
        )
        .route(
            "/admin/testimonials/{id}",
            post(admin::promote_testimonial_handler),
        )
        .route(
            "/admin/blog",
            get(admin::list_blog_posts_handler).post(admin::create_blog_post_handler),
        )
        .route(
            "/admin/blog/{id}",
            put(admin::update_blog_post_handler).delete(admin::delete_blog_post_handler),
        )
        .route(
            "/admin/case-studies",
            get(admin::list_case_studies_handler).post(admin::create_case_study_handler),
        )
        .route(
            "/admin/case-studies/{id}",
            put(admin::update_case_study_handler).delete(admin::delete_case_study_handler),
        )
        .route(
            "/admin/events",
            get(admin::list_events_handler).post(admin::create_event_handler),
        )
        .route(
            "/admin/events/{id}",
            put(admin::update_event_handler).delete(admin::delete_event_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_admin,
        ));

    let cors = cors_layer(&app_state.config.allowed_origin);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
