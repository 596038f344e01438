//! services/api/src/web/public.rs
//!
//! Handlers behind the public site: published content listings and the
//! contact and feedback forms.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use site_core::domain::{
    BlogPost, CaseStudy, ContactSubmission, Event, FeedbackSubmission, NewContactSubmission,
    NewFeedbackSubmission,
};
use std::sync::Arc;
use tracing::info;

use crate::error::{port_error, HttpError};
use crate::web::listing::{paginate, require, require_rating, Page, PageQuery};
use crate::web::state::AppState;

/// GET /health
pub async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

//=========================================================================================
// Visitor Submissions
//=========================================================================================

/// POST /contact - Submit the contact form
#[utoipa::path(
    post,
    path = "/contact",
    request_body = NewContactSubmission,
    responses(
        (status = 201, description = "Message received", body = ContactSubmission),
        (status = 400, description = "A required field is missing"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_contact_handler(
    State(state): State<Arc<AppState>>,
    Json(mut req): Json<NewContactSubmission>,
) -> Result<impl IntoResponse, HttpError> {
    require(&[
        ("name", req.name.as_str()),
        ("email", req.email.as_str()),
        ("message", req.message.as_str()),
    ])?;
    req.company = req.company.filter(|c| !c.trim().is_empty());

    let contact = state
        .store
        .insert_contact(req)
        .await
        .map_err(|e| port_error("send your message", e))?;
    info!("New contact submission {}", contact.id);
    Ok((StatusCode::CREATED, Json(contact)))
}

/// POST /feedback - Leave a rating
#[utoipa::path(
    post,
    path = "/feedback",
    request_body = NewFeedbackSubmission,
    responses(
        (status = 201, description = "Feedback received", body = FeedbackSubmission),
        (status = 400, description = "A required field is missing or the rating is out of range"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_feedback_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewFeedbackSubmission>,
) -> Result<impl IntoResponse, HttpError> {
    require(&[
        ("name", req.name.as_str()),
        ("email", req.email.as_str()),
        ("feedback", req.feedback.as_str()),
    ])?;
    require_rating(req.rating)?;

    let feedback = state
        .store
        .insert_feedback(req)
        .await
        .map_err(|e| port_error("submit your feedback", e))?;
    info!("New feedback {} rated {}", feedback.id, feedback.rating);
    Ok((StatusCode::CREATED, Json(feedback)))
}

//=========================================================================================
// Published Content
//=========================================================================================

/// GET /testimonials - Feedback promoted to public testimonials
#[utoipa::path(
    get,
    path = "/testimonials",
    responses((status = 200, body = [FeedbackSubmission]))
)]
pub async fn list_testimonials_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeedbackSubmission>>, HttpError> {
    let feedback = state
        .store
        .list_feedback()
        .await
        .map_err(|e| port_error("load testimonials", e))?;
    Ok(Json(
        feedback
            .into_iter()
            .filter(FeedbackSubmission::is_public_testimonial)
            .collect(),
    ))
}

/// GET /blog - Published posts, optionally for one category
#[utoipa::path(
    get,
    path = "/blog",
    params(PageQuery),
    responses((status = 200, description = "A page of published blog posts"))
)]
pub async fn list_blog_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BlogPost>>, HttpError> {
    let posts = state
        .store
        .list_blog_posts()
        .await
        .map_err(|e| port_error("load blog posts", e))?;

    let category = query.category.as_deref().filter(|c| *c != "All");
    let posts = posts
        .into_iter()
        .filter(|p| p.published)
        .filter(|p| category.map_or(true, |c| p.category == c))
        .collect();
    Ok(Json(paginate(posts, &query)?))
}

/// GET /blog/{id} - A single published post
#[utoipa::path(
    get,
    path = "/blog/{id}",
    params(("id" = i64, Path, description = "Blog post id")),
    responses(
        (status = 200, body = BlogPost),
        (status = 404, description = "No such published post")
    )
)]
pub async fn get_blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<BlogPost>, HttpError> {
    let post = state
        .store
        .get_blog_post(id)
        .await
        .map_err(|e| port_error("load the blog post", e))?;
    if !post.published {
        return Err((StatusCode::NOT_FOUND, format!("Blog post {} not found", id)));
    }
    Ok(Json(post))
}

/// GET /case-studies - Published case studies
#[utoipa::path(
    get,
    path = "/case-studies",
    params(PageQuery),
    responses((status = 200, description = "A page of published case studies"))
)]
pub async fn list_case_studies_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CaseStudy>>, HttpError> {
    let studies = state
        .store
        .list_case_studies()
        .await
        .map_err(|e| port_error("load case studies", e))?;
    let studies = studies.into_iter().filter(|s| s.published).collect();
    Ok(Json(paginate(studies, &query)?))
}

/// GET /events - Published events
#[utoipa::path(
    get,
    path = "/events",
    params(PageQuery),
    responses((status = 200, description = "A page of published events"))
)]
pub async fn list_events_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Event>>, HttpError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| port_error("load events", e))?;
    let events = events.into_iter().filter(|e| e.published).collect();
    Ok(Json(paginate(events, &query)?))
}
