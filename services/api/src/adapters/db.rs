//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of
//! the `ContentStore` port from the core crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::domain::{
    AdminCredentials, AdminUser, BlogPost, CaseStudy, ContactStatus, ContactSubmission, Event,
    FeedbackSubmission, NewBlogPost, NewCaseStudy, NewContactSubmission, NewEvent,
    NewFeedbackSubmission,
};
use site_core::ports::{ContentStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ContentStore` port.
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    /// Creates a new `PgContentStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn lookup_error(what: &str, id: impl std::fmt::Display) -> impl FnOnce(sqlx::Error) -> PortError {
    let label = format!("{} {} not found", what, id);
    move |e| match e {
        sqlx::Error::RowNotFound => PortError::NotFound(label),
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn ensure_deleted(what: &str, id: i64, rows_affected: u64) -> PortResult<()> {
    if rows_affected == 0 {
        return Err(PortError::NotFound(format!("{} {} not found", what, id)));
    }
    Ok(())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ContactRecord {
    id: i64,
    name: String,
    email: String,
    company: Option<String>,
    message: String,
    status: String,
    created_at: DateTime<Utc>,
}
impl ContactRecord {
    fn to_domain(self) -> ContactSubmission {
        ContactSubmission {
            id: self.id,
            name: self.name,
            email: self.email,
            company: self.company,
            message: self.message,
            status: ContactStatus::from_db(&self.status),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct FeedbackRecord {
    id: i64,
    name: String,
    email: String,
    rating: i32,
    feedback: String,
    position: Option<String>,
    company: Option<String>,
    avatar: Option<String>,
    is_testimonial: bool,
    published: bool,
    created_at: DateTime<Utc>,
}
impl FeedbackRecord {
    fn to_domain(self) -> FeedbackSubmission {
        FeedbackSubmission {
            id: self.id,
            name: self.name,
            email: self.email,
            rating: self.rating,
            feedback: self.feedback,
            position: self.position,
            company: self.company,
            avatar: self.avatar,
            is_testimonial: self.is_testimonial,
            published: self.published,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct BlogPostRecord {
    id: i64,
    title: String,
    excerpt: String,
    content: String,
    author: String,
    category: String,
    tags: Vec<String>,
    read_time: String,
    image: String,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl BlogPostRecord {
    fn to_domain(self) -> BlogPost {
        BlogPost {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author: self.author,
            category: self.category,
            tags: self.tags,
            read_time: self.read_time,
            image: self.image,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct CaseStudyRecord {
    id: i64,
    title: String,
    client: String,
    industry: String,
    challenge: String,
    solution: String,
    results: Vec<String>,
    technologies: Vec<String>,
    image: String,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl CaseStudyRecord {
    fn to_domain(self) -> CaseStudy {
        CaseStudy {
            id: self.id,
            title: self.title,
            client: self.client,
            industry: self.industry,
            challenge: self.challenge,
            solution: self.solution,
            results: self.results,
            technologies: self.technologies,
            image: self.image,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct EventRecord {
    id: i64,
    title: String,
    date: String,
    location: String,
    description: String,
    category: String,
    image: String,
    attendees: i32,
    published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl EventRecord {
    fn to_domain(self) -> Event {
        Event {
            id: self.id,
            title: self.title,
            date: self.date,
            location: self.location,
            description: self.description,
            category: self.category,
            image: self.image,
            attendees: self.attendees,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct AdminSessionRecord {
    username: String,
    issued_at: DateTime<Utc>,
}

const CONTACT_COLUMNS: &str = "id, name, email, company, message, status, created_at";
const FEEDBACK_COLUMNS: &str =
    "id, name, email, rating, feedback, position, company, avatar, is_testimonial, published, created_at";
const BLOG_COLUMNS: &str = "id, title, excerpt, content, author, category, tags, read_time, image, published, created_at, updated_at";
const CASE_STUDY_COLUMNS: &str = "id, title, client, industry, challenge, solution, results, technologies, image, published, created_at, updated_at";
const EVENT_COLUMNS: &str = "id, title, date, location, description, category, image, attendees, published, created_at, updated_at";

//=========================================================================================
// `ContentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ContentStore for PgContentStore {
    async fn insert_contact(&self, contact: NewContactSubmission) -> PortResult<ContactSubmission> {
        let sql = format!(
            "INSERT INTO contact_submissions (name, email, company, message) VALUES ($1, $2, $3, $4) RETURNING {}",
            CONTACT_COLUMNS
        );
        let record = sqlx::query_as::<_, ContactRecord>(&sql)
            .bind(contact.name)
            .bind(contact.email)
            .bind(contact.company)
            .bind(contact.message)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_contacts(&self) -> PortResult<Vec<ContactSubmission>> {
        let sql = format!(
            "SELECT {} FROM contact_submissions ORDER BY created_at DESC, id DESC",
            CONTACT_COLUMNS
        );
        let records = sqlx::query_as::<_, ContactRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> PortResult<ContactSubmission> {
        let sql = format!(
            "UPDATE contact_submissions SET status = $1 WHERE id = $2 RETURNING {}",
            CONTACT_COLUMNS
        );
        let record = sqlx::query_as::<_, ContactRecord>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Contact", id))?;
        Ok(record.to_domain())
    }

    async fn delete_contact(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_deleted("Contact", id, result.rows_affected())
    }

    async fn insert_feedback(
        &self,
        feedback: NewFeedbackSubmission,
    ) -> PortResult<FeedbackSubmission> {
        let sql = format!(
            "INSERT INTO feedback_submissions (name, email, rating, feedback, position, company) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            FEEDBACK_COLUMNS
        );
        let record = sqlx::query_as::<_, FeedbackRecord>(&sql)
            .bind(feedback.name)
            .bind(feedback.email)
            .bind(feedback.rating)
            .bind(feedback.feedback)
            .bind(feedback.position)
            .bind(feedback.company)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_feedback(&self) -> PortResult<Vec<FeedbackSubmission>> {
        let sql = format!(
            "SELECT {} FROM feedback_submissions ORDER BY created_at DESC, id DESC",
            FEEDBACK_COLUMNS
        );
        let records = sqlx::query_as::<_, FeedbackRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn promote_to_testimonial(&self, id: i64) -> PortResult<FeedbackSubmission> {
        let sql = format!(
            "UPDATE feedback_submissions SET is_testimonial = TRUE, published = TRUE WHERE id = $1 RETURNING {}",
            FEEDBACK_COLUMNS
        );
        let record = sqlx::query_as::<_, FeedbackRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Feedback", id))?;
        Ok(record.to_domain())
    }

    async fn delete_feedback(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM feedback_submissions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_deleted("Feedback", id, result.rows_affected())
    }

    async fn list_blog_posts(&self) -> PortResult<Vec<BlogPost>> {
        let sql = format!(
            "SELECT {} FROM blog_posts ORDER BY created_at DESC, id DESC",
            BLOG_COLUMNS
        );
        let records = sqlx::query_as::<_, BlogPostRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_blog_post(&self, id: i64) -> PortResult<BlogPost> {
        let sql = format!("SELECT {} FROM blog_posts WHERE id = $1", BLOG_COLUMNS);
        let record = sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Blog post", id))?;
        Ok(record.to_domain())
    }

    async fn create_blog_post(&self, post: NewBlogPost) -> PortResult<BlogPost> {
        let sql = format!(
            "INSERT INTO blog_posts (title, excerpt, content, author, category, tags, read_time, image, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            BLOG_COLUMNS
        );
        let record = sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(post.title)
            .bind(post.excerpt)
            .bind(post.content)
            .bind(post.author)
            .bind(post.category)
            .bind(post.tags)
            .bind(post.read_time)
            .bind(post.image)
            .bind(post.published)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_blog_post(&self, id: i64, post: NewBlogPost) -> PortResult<BlogPost> {
        let sql = format!(
            "UPDATE blog_posts SET title = $1, excerpt = $2, content = $3, author = $4, category = $5, \
             tags = $6, read_time = $7, image = $8, published = $9, updated_at = now() \
             WHERE id = $10 RETURNING {}",
            BLOG_COLUMNS
        );
        let record = sqlx::query_as::<_, BlogPostRecord>(&sql)
            .bind(post.title)
            .bind(post.excerpt)
            .bind(post.content)
            .bind(post.author)
            .bind(post.category)
            .bind(post.tags)
            .bind(post.read_time)
            .bind(post.image)
            .bind(post.published)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Blog post", id))?;
        Ok(record.to_domain())
    }

    async fn delete_blog_post(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_deleted("Blog post", id, result.rows_affected())
    }

    async fn list_case_studies(&self) -> PortResult<Vec<CaseStudy>> {
        let sql = format!(
            "SELECT {} FROM case_studies ORDER BY created_at DESC, id DESC",
            CASE_STUDY_COLUMNS
        );
        let records = sqlx::query_as::<_, CaseStudyRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_case_study(&self, study: NewCaseStudy) -> PortResult<CaseStudy> {
        let sql = format!(
            "INSERT INTO case_studies (title, client, industry, challenge, solution, results, technologies, image, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            CASE_STUDY_COLUMNS
        );
        let record = sqlx::query_as::<_, CaseStudyRecord>(&sql)
            .bind(study.title)
            .bind(study.client)
            .bind(study.industry)
            .bind(study.challenge)
            .bind(study.solution)
            .bind(study.results)
            .bind(study.technologies)
            .bind(study.image)
            .bind(study.published)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_case_study(&self, id: i64, study: NewCaseStudy) -> PortResult<CaseStudy> {
        let sql = format!(
            "UPDATE case_studies SET title = $1, client = $2, industry = $3, challenge = $4, solution = $5, \
             results = $6, technologies = $7, image = $8, published = $9, updated_at = now() \
             WHERE id = $10 RETURNING {}",
            CASE_STUDY_COLUMNS
        );
        let record = sqlx::query_as::<_, CaseStudyRecord>(&sql)
            .bind(study.title)
            .bind(study.client)
            .bind(study.industry)
            .bind(study.challenge)
            .bind(study.solution)
            .bind(study.results)
            .bind(study.technologies)
            .bind(study.image)
            .bind(study.published)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Case study", id))?;
        Ok(record.to_domain())
    }

    async fn delete_case_study(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM case_studies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_deleted("Case study", id, result.rows_affected())
    }

    async fn list_events(&self) -> PortResult<Vec<Event>> {
        let sql = format!(
            "SELECT {} FROM events ORDER BY created_at DESC, id DESC",
            EVENT_COLUMNS
        );
        let records = sqlx::query_as::<_, EventRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_event(&self, event: NewEvent) -> PortResult<Event> {
        let sql = format!(
            "INSERT INTO events (title, date, location, description, category, image, attendees, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
            EVENT_COLUMNS
        );
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(event.title)
            .bind(event.date)
            .bind(event.location)
            .bind(event.description)
            .bind(event.category)
            .bind(event.image)
            .bind(event.attendees)
            .bind(event.published)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> PortResult<Event> {
        let sql = format!(
            "UPDATE events SET title = $1, date = $2, location = $3, description = $4, category = $5, \
             image = $6, attendees = $7, published = $8, updated_at = now() \
             WHERE id = $9 RETURNING {}",
            EVENT_COLUMNS
        );
        let record = sqlx::query_as::<_, EventRecord>(&sql)
            .bind(event.title)
            .bind(event.date)
            .bind(event.location)
            .bind(event.description)
            .bind(event.category)
            .bind(event.image)
            .bind(event.attendees)
            .bind(event.published)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(lookup_error("Event", id))?;
        Ok(record.to_domain())
    }

    async fn delete_event(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        ensure_deleted("Event", id, result.rows_affected())
    }

    async fn get_admin_credentials(&self, username: &str) -> PortResult<AdminCredentials> {
        let (username, password_hash) = sqlx::query_as::<_, (String, String)>(
            "SELECT username, password_hash FROM admin_users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(lookup_error("Admin user", username))?;
        Ok(AdminCredentials {
            username,
            password_hash,
        })
    }

    async fn upsert_admin_credentials(&self, credentials: AdminCredentials) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO admin_users (username, password_hash) VALUES ($1, $2) \
             ON CONFLICT (username) DO UPDATE SET password_hash = EXCLUDED.password_hash",
        )
        .bind(credentials.username)
        .bind(credentials.password_hash)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn create_admin_session(
        &self,
        token: &str,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO admin_sessions (id, username, issued_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(username)
            .bind(issued_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn purge_admin_sessions(&self, issued_before: DateTime<Utc>) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE issued_at < $1")
            .bind(issued_before)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn get_admin_session(&self, token: &str) -> PortResult<(AdminUser, DateTime<Utc>)> {
        let record = sqlx::query_as::<_, AdminSessionRecord>(
            "SELECT username, issued_at FROM admin_sessions WHERE id = $1",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok((
            AdminUser {
                username: record.username,
            },
            record.issued_at,
        ))
    }

    async fn delete_admin_session(&self, token: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM admin_sessions WHERE id = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
