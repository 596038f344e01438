//! crates/site_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the site's core logic.
//! These traits form the boundary between the pure domain and the outside
//! world: the content database, durable key-value storage for the admin
//! session, and the credential check used at login.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AdminCredentials, AdminUser, BlogPost, CaseStudy, ContactStatus, ContactSubmission, Event,
    FeedbackSubmission, NewBlogPost, NewCaseStudy, NewContactSubmission, NewEvent,
    NewFeedbackSubmission,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Row-based access to the site's content collections.
///
/// Every `list_*` method returns records ordered by creation time, newest first.
#[async_trait]
pub trait ContentStore: Send + Sync {
    // --- Contact Submissions ---
    async fn insert_contact(&self, contact: NewContactSubmission) -> PortResult<ContactSubmission>;

    async fn list_contacts(&self) -> PortResult<Vec<ContactSubmission>>;

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> PortResult<ContactSubmission>;

    async fn delete_contact(&self, id: i64) -> PortResult<()>;

    // --- Feedback & Testimonials ---
    async fn insert_feedback(
        &self,
        feedback: NewFeedbackSubmission,
    ) -> PortResult<FeedbackSubmission>;

    async fn list_feedback(&self) -> PortResult<Vec<FeedbackSubmission>>;

    /// Marks a feedback row as a published testimonial.
    async fn promote_to_testimonial(&self, id: i64) -> PortResult<FeedbackSubmission>;

    async fn delete_feedback(&self, id: i64) -> PortResult<()>;

    // --- Blog Posts ---
    async fn list_blog_posts(&self) -> PortResult<Vec<BlogPost>>;

    async fn get_blog_post(&self, id: i64) -> PortResult<BlogPost>;

    async fn create_blog_post(&self, post: NewBlogPost) -> PortResult<BlogPost>;

    async fn update_blog_post(&self, id: i64, post: NewBlogPost) -> PortResult<BlogPost>;

    async fn delete_blog_post(&self, id: i64) -> PortResult<()>;

    // --- Case Studies ---
    async fn list_case_studies(&self) -> PortResult<Vec<CaseStudy>>;

    async fn create_case_study(&self, study: NewCaseStudy) -> PortResult<CaseStudy>;

    async fn update_case_study(&self, id: i64, study: NewCaseStudy) -> PortResult<CaseStudy>;

    async fn delete_case_study(&self, id: i64) -> PortResult<()>;

    // --- Events ---
    async fn list_events(&self) -> PortResult<Vec<Event>>;

    async fn create_event(&self, event: NewEvent) -> PortResult<Event>;

    async fn update_event(&self, id: i64, event: NewEvent) -> PortResult<Event>;

    async fn delete_event(&self, id: i64) -> PortResult<()>;

    // --- Admin Auth ---
    async fn get_admin_credentials(&self, username: &str) -> PortResult<AdminCredentials>;

    /// Creates the admin account, or replaces its password hash if it exists.
    async fn upsert_admin_credentials(&self, credentials: AdminCredentials) -> PortResult<()>;

    async fn create_admin_session(
        &self,
        token: &str,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Deletes every session issued before `issued_before`; returns how many went.
    async fn purge_admin_sessions(&self, issued_before: DateTime<Utc>) -> PortResult<u64>;

    /// Returns the user and issue time behind a token, without checking expiry.
    async fn get_admin_session(&self, token: &str) -> PortResult<(AdminUser, DateTime<Utc>)>;

    async fn delete_admin_session(&self, token: &str) -> PortResult<()>;
}

/// Durable string key-value storage that survives restarts
/// (the equivalent of a browser's local storage).
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> PortResult<()>;

    fn remove(&mut self, key: &str) -> PortResult<()>;
}

/// Checks a username/password pair against wherever admin accounts live.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Returns `Ok(None)` when the credentials are rejected.
    async fn verify(&self, username: &str, password: &str) -> PortResult<Option<AdminUser>>;
}
