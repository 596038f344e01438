//! services/api/src/web/admin.rs
//!
//! Handlers behind the admin dashboard. Every route here sits behind
//! `require_admin`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use site_core::domain::{
    BlogPost, CaseStudy, ContactStatus, ContactSubmission, Event, FeedbackSubmission, NewBlogPost,
    NewCaseStudy, NewEvent, OverviewStats,
};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{port_error, HttpError};
use crate::web::listing::{paginate, require, Page, PageQuery};
use crate::web::state::AppState;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: ContactStatus,
}

//=========================================================================================
// Overview
//=========================================================================================

/// GET /admin/overview - Dashboard counters
#[utoipa::path(
    get,
    path = "/admin/overview",
    responses((status = 200, body = OverviewStats), (status = 401, description = "Not logged in"))
)]
pub async fn overview_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OverviewStats>, HttpError> {
    let store = &state.store;
    let (contacts, feedback, posts) = tokio::try_join!(
        store.list_contacts(),
        store.list_feedback(),
        store.list_blog_posts()
    )
    .map_err(|e| port_error("load the overview", e))?;
    Ok(Json(OverviewStats::from_collections(
        &contacts, &feedback, &posts,
    )))
}

//=========================================================================================
// Contacts
//=========================================================================================

pub async fn list_contacts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<ContactSubmission>>, HttpError> {
    let contacts = state
        .store
        .list_contacts()
        .await
        .map_err(|e| port_error("load contacts", e))?;
    Ok(Json(paginate(contacts, &query)?))
}

/// PUT /admin/contacts/{id}/status - Track follow-up on a contact
#[utoipa::path(
    put,
    path = "/admin/contacts/{id}/status",
    params(("id" = i64, Path, description = "Contact id")),
    request_body = StatusUpdate,
    responses((status = 200, body = ContactSubmission), (status = 404, description = "No such contact"))
)]
pub async fn update_contact_status_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<ContactSubmission>, HttpError> {
    let contact = state
        .store
        .update_contact_status(id, update.status)
        .await
        .map_err(|e| port_error("update the contact", e))?;
    info!("Contact {} marked {}", id, update.status.as_str());
    Ok(Json(contact))
}

pub async fn delete_contact_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state
        .store
        .delete_contact(id)
        .await
        .map_err(|e| port_error("delete the contact", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Feedback & Testimonials
//=========================================================================================

pub async fn list_feedback_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<FeedbackSubmission>>, HttpError> {
    let feedback = state
        .store
        .list_feedback()
        .await
        .map_err(|e| port_error("load feedback", e))?;
    Ok(Json(paginate(feedback, &query)?))
}

pub async fn delete_feedback_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state
        .store
        .delete_feedback(id)
        .await
        .map_err(|e| port_error("delete the feedback", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/testimonials/candidates - 4 and 5 star reviews not yet promoted
pub async fn testimonial_candidates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeedbackSubmission>>, HttpError> {
    let feedback = state
        .store
        .list_feedback()
        .await
        .map_err(|e| port_error("load available reviews", e))?;
    Ok(Json(
        feedback
            .into_iter()
            .filter(FeedbackSubmission::is_testimonial_candidate)
            .collect(),
    ))
}

/// POST /admin/testimonials/{id} - Publish a review as a testimonial
#[utoipa::path(
    post,
    path = "/admin/testimonials/{id}",
    params(("id" = i64, Path, description = "Feedback id")),
    responses((status = 200, body = FeedbackSubmission), (status = 404, description = "No such feedback"))
)]
pub async fn promote_testimonial_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<FeedbackSubmission>, HttpError> {
    let feedback = state
        .store
        .promote_to_testimonial(id)
        .await
        .map_err(|e| port_error("select the testimonial", e))?;
    info!("Feedback {} published as testimonial", id);
    Ok(Json(feedback))
}

//=========================================================================================
// Blog Posts
//=========================================================================================

fn validate_post(post: &NewBlogPost) -> Result<(), HttpError> {
    require(&[
        ("title", post.title.as_str()),
        ("excerpt", post.excerpt.as_str()),
        ("content", post.content.as_str()),
        ("author", post.author.as_str()),
        ("category", post.category.as_str()),
    ])
}

/// Trims tags and drops empty ones, as entered in a comma-separated field.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

pub async fn list_blog_posts_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<BlogPost>>, HttpError> {
    let posts = state
        .store
        .list_blog_posts()
        .await
        .map_err(|e| port_error("load blog posts", e))?;
    Ok(Json(paginate(posts, &query)?))
}

/// POST /admin/blog - Create a blog post
#[utoipa::path(
    post,
    path = "/admin/blog",
    request_body = NewBlogPost,
    responses((status = 201, body = BlogPost), (status = 400, description = "A required field is missing"))
)]
pub async fn create_blog_post_handler(
    State(state): State<Arc<AppState>>,
    Json(mut post): Json<NewBlogPost>,
) -> Result<impl IntoResponse, HttpError> {
    validate_post(&post)?;
    post.tags = clean_tags(post.tags);
    let post = state
        .store
        .create_blog_post(post)
        .await
        .map_err(|e| port_error("save the blog post", e))?;
    info!("Created blog post {}", post.id);
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn update_blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut post): Json<NewBlogPost>,
) -> Result<Json<BlogPost>, HttpError> {
    validate_post(&post)?;
    post.tags = clean_tags(post.tags);
    let post = state
        .store
        .update_blog_post(id, post)
        .await
        .map_err(|e| port_error("save the blog post", e))?;
    Ok(Json(post))
}

pub async fn delete_blog_post_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state
        .store
        .delete_blog_post(id)
        .await
        .map_err(|e| port_error("delete the blog post", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Case Studies
//=========================================================================================

fn validate_case_study(study: &NewCaseStudy) -> Result<(), HttpError> {
    require(&[
        ("title", study.title.as_str()),
        ("client", study.client.as_str()),
        ("industry", study.industry.as_str()),
        ("challenge", study.challenge.as_str()),
        ("solution", study.solution.as_str()),
    ])
}

pub async fn list_case_studies_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CaseStudy>>, HttpError> {
    let studies = state
        .store
        .list_case_studies()
        .await
        .map_err(|e| port_error("load case studies", e))?;
    Ok(Json(paginate(studies, &query)?))
}

pub async fn create_case_study_handler(
    State(state): State<Arc<AppState>>,
    Json(study): Json<NewCaseStudy>,
) -> Result<impl IntoResponse, HttpError> {
    validate_case_study(&study)?;
    let study = state
        .store
        .create_case_study(study)
        .await
        .map_err(|e| port_error("save the case study", e))?;
    info!("Created case study {}", study.id);
    Ok((StatusCode::CREATED, Json(study)))
}

pub async fn update_case_study_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(study): Json<NewCaseStudy>,
) -> Result<Json<CaseStudy>, HttpError> {
    validate_case_study(&study)?;
    let study = state
        .store
        .update_case_study(id, study)
        .await
        .map_err(|e| port_error("save the case study", e))?;
    Ok(Json(study))
}

pub async fn delete_case_study_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state
        .store
        .delete_case_study(id)
        .await
        .map_err(|e| port_error("delete the case study", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Events
//=========================================================================================

fn validate_event(event: &NewEvent) -> Result<(), HttpError> {
    require(&[
        ("title", event.title.as_str()),
        ("date", event.date.as_str()),
        ("location", event.location.as_str()),
        ("description", event.description.as_str()),
    ])?;
    if event.attendees < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "attendees must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub async fn list_events_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Event>>, HttpError> {
    let events = state
        .store
        .list_events()
        .await
        .map_err(|e| port_error("load events", e))?;
    Ok(Json(paginate(events, &query)?))
}

pub async fn create_event_handler(
    State(state): State<Arc<AppState>>,
    Json(event): Json<NewEvent>,
) -> Result<impl IntoResponse, HttpError> {
    validate_event(&event)?;
    let event = state
        .store
        .create_event(event)
        .await
        .map_err(|e| port_error("save the event", e))?;
    info!("Created event {}", event.id);
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(event): Json<NewEvent>,
) -> Result<Json<Event>, HttpError> {
    validate_event(&event)?;
    let event = state
        .store
        .update_event(id, event)
        .await
        .map_err(|e| port_error("save the event", e))?;
    Ok(Json(event))
}

pub async fn delete_event_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    state
        .store
        .delete_event(id)
        .await
        .map_err(|e| port_error("delete the event", e))?;
    Ok(StatusCode::NO_CONTENT)
}
