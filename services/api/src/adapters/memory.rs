//! services/api/src/adapters/memory.rs
//!
//! An in-process `ContentStore` backed by vectors behind a `RwLock`.
//! Used by the test suite and for running the API without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use site_core::domain::{
    AdminCredentials, AdminUser, BlogPost, CaseStudy, ContactStatus, ContactSubmission, Event,
    FeedbackSubmission, NewBlogPost, NewCaseStudy, NewContactSubmission, NewEvent,
    NewFeedbackSubmission,
};
use site_core::ports::{ContentStore, PortError, PortResult};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    next_id: i64,
    contacts: Vec<ContactSubmission>,
    feedback: Vec<FeedbackSubmission>,
    blog_posts: Vec<BlogPost>,
    case_studies: Vec<CaseStudy>,
    events: Vec<Event>,
    admins: HashMap<String, String>,
    sessions: HashMap<String, (String, DateTime<Utc>)>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryContentStore {
    tables: RwLock<Tables>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; ids break ties between rows created in the same instant.
fn newest_first<T: Clone>(rows: &[T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

fn find_mut<'a, T>(
    rows: &'a mut [T],
    what: &str,
    id: i64,
    id_of: impl Fn(&T) -> i64,
) -> PortResult<&'a mut T> {
    rows.iter_mut()
        .find(|row| id_of(row) == id)
        .ok_or_else(|| PortError::NotFound(format!("{} {} not found", what, id)))
}

fn remove<T>(rows: &mut Vec<T>, what: &str, id: i64, id_of: impl Fn(&T) -> i64) -> PortResult<()> {
    let before = rows.len();
    rows.retain(|row| id_of(row) != id);
    if rows.len() == before {
        return Err(PortError::NotFound(format!("{} {} not found", what, id)));
    }
    Ok(())
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn insert_contact(&self, contact: NewContactSubmission) -> PortResult<ContactSubmission> {
        let mut tables = self.tables.write().await;
        let record = ContactSubmission {
            id: tables.next_id(),
            name: contact.name,
            email: contact.email,
            company: contact.company,
            message: contact.message,
            status: ContactStatus::New,
            created_at: Utc::now(),
        };
        tables.contacts.push(record.clone());
        Ok(record)
    }

    async fn list_contacts(&self) -> PortResult<Vec<ContactSubmission>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.contacts, |c| (c.created_at, c.id)))
    }

    async fn update_contact_status(
        &self,
        id: i64,
        status: ContactStatus,
    ) -> PortResult<ContactSubmission> {
        let mut tables = self.tables.write().await;
        let contact = find_mut(&mut tables.contacts, "Contact", id, |c| c.id)?;
        contact.status = status;
        Ok(contact.clone())
    }

    async fn delete_contact(&self, id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.contacts, "Contact", id, |c| c.id)
    }

    async fn insert_feedback(
        &self,
        feedback: NewFeedbackSubmission,
    ) -> PortResult<FeedbackSubmission> {
        let mut tables = self.tables.write().await;
        let record = FeedbackSubmission {
            id: tables.next_id(),
            name: feedback.name,
            email: feedback.email,
            rating: feedback.rating,
            feedback: feedback.feedback,
            position: feedback.position,
            company: feedback.company,
            avatar: None,
            is_testimonial: false,
            published: false,
            created_at: Utc::now(),
        };
        tables.feedback.push(record.clone());
        Ok(record)
    }

    async fn list_feedback(&self) -> PortResult<Vec<FeedbackSubmission>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.feedback, |f| (f.created_at, f.id)))
    }

    async fn promote_to_testimonial(&self, id: i64) -> PortResult<FeedbackSubmission> {
        let mut tables = self.tables.write().await;
        let feedback = find_mut(&mut tables.feedback, "Feedback", id, |f| f.id)?;
        feedback.is_testimonial = true;
        feedback.published = true;
        Ok(feedback.clone())
    }

    async fn delete_feedback(&self, id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.feedback, "Feedback", id, |f| f.id)
    }

    async fn list_blog_posts(&self) -> PortResult<Vec<BlogPost>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.blog_posts, |p| (p.created_at, p.id)))
    }

    async fn get_blog_post(&self, id: i64) -> PortResult<BlogPost> {
        let tables = self.tables.read().await;
        tables
            .blog_posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Blog post {} not found", id)))
    }

    async fn create_blog_post(&self, post: NewBlogPost) -> PortResult<BlogPost> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let record = BlogPost {
            id: tables.next_id(),
            title: post.title,
            excerpt: post.excerpt,
            content: post.content,
            author: post.author,
            category: post.category,
            tags: post.tags,
            read_time: post.read_time,
            image: post.image,
            published: post.published,
            created_at: now,
            updated_at: now,
        };
        tables.blog_posts.push(record.clone());
        Ok(record)
    }

    async fn update_blog_post(&self, id: i64, post: NewBlogPost) -> PortResult<BlogPost> {
        let mut tables = self.tables.write().await;
        let record = find_mut(&mut tables.blog_posts, "Blog post", id, |p| p.id)?;
        record.title = post.title;
        record.excerpt = post.excerpt;
        record.content = post.content;
        record.author = post.author;
        record.category = post.category;
        record.tags = post.tags;
        record.read_time = post.read_time;
        record.image = post.image;
        record.published = post.published;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_blog_post(&self, id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.blog_posts, "Blog post", id, |p| p.id)
    }

    async fn list_case_studies(&self) -> PortResult<Vec<CaseStudy>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.case_studies, |s| (s.created_at, s.id)))
    }

    async fn create_case_study(&self, study: NewCaseStudy) -> PortResult<CaseStudy> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let record = CaseStudy {
            id: tables.next_id(),
            title: study.title,
            client: study.client,
            industry: study.industry,
            challenge: study.challenge,
            solution: study.solution,
            results: study.results,
            technologies: study.technologies,
            image: study.image,
            published: study.published,
            created_at: now,
            updated_at: now,
        };
        tables.case_studies.push(record.clone());
        Ok(record)
    }

    async fn update_case_study(&self, id: i64, study: NewCaseStudy) -> PortResult<CaseStudy> {
        let mut tables = self.tables.write().await;
        let record = find_mut(&mut tables.case_studies, "Case study", id, |s| s.id)?;
        record.title = study.title;
        record.client = study.client;
        record.industry = study.industry;
        record.challenge = study.challenge;
        record.solution = study.solution;
        record.results = study.results;
        record.technologies = study.technologies;
        record.image = study.image;
        record.published = study.published;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_case_study(&self, id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.case_studies, "Case study", id, |s| s.id)
    }

    async fn list_events(&self) -> PortResult<Vec<Event>> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.events, |e| (e.created_at, e.id)))
    }

    async fn create_event(&self, event: NewEvent) -> PortResult<Event> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let record = Event {
            id: tables.next_id(),
            title: event.title,
            date: event.date,
            location: event.location,
            description: event.description,
            category: event.category,
            image: event.image,
            attendees: event.attendees,
            published: event.published,
            created_at: now,
            updated_at: now,
        };
        tables.events.push(record.clone());
        Ok(record)
    }

    async fn update_event(&self, id: i64, event: NewEvent) -> PortResult<Event> {
        let mut tables = self.tables.write().await;
        let record = find_mut(&mut tables.events, "Event", id, |e| e.id)?;
        record.title = event.title;
        record.date = event.date;
        record.location = event.location;
        record.description = event.description;
        record.category = event.category;
        record.image = event.image;
        record.attendees = event.attendees;
        record.published = event.published;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete_event(&self, id: i64) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.events, "Event", id, |e| e.id)
    }

    async fn get_admin_credentials(&self, username: &str) -> PortResult<AdminCredentials> {
        let tables = self.tables.read().await;
        tables
            .admins
            .get(username)
            .map(|hash| AdminCredentials {
                username: username.to_string(),
                password_hash: hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("Admin user {} not found", username)))
    }

    async fn upsert_admin_credentials(&self, credentials: AdminCredentials) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .admins
            .insert(credentials.username, credentials.password_hash);
        Ok(())
    }

    async fn create_admin_session(
        &self,
        token: &str,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .sessions
            .insert(token.to_string(), (username.to_string(), issued_at));
        Ok(())
    }

    async fn purge_admin_sessions(&self, issued_before: DateTime<Utc>) -> PortResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables
            .sessions
            .retain(|_, (_, issued_at)| *issued_at >= issued_before);
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn get_admin_session(&self, token: &str) -> PortResult<(AdminUser, DateTime<Utc>)> {
        let tables = self.tables.read().await;
        tables
            .sessions
            .get(token)
            .map(|(username, issued_at)| {
                (
                    AdminUser {
                        username: username.clone(),
                    },
                    *issued_at,
                )
            })
            .ok_or(PortError::Unauthorized)
    }

    async fn delete_admin_session(&self, token: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        tables.sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(name: &str) -> NewContactSubmission {
        NewContactSubmission {
            name: name.to_string(),
            email: format!("{}@example.com", name),
            company: None,
            message: "hello".to_string(),
        }
    }

    #[tokio::test]
    async fn lists_newest_first() {
        let store = MemoryContentStore::new();
        store.insert_contact(contact("first")).await.unwrap();
        store.insert_contact(contact("second")).await.unwrap();

        let contacts = store.list_contacts().await.unwrap();
        assert_eq!(contacts[0].name, "second");
        assert_eq!(contacts[1].name, "first");
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryContentStore::new();
        assert!(matches!(
            store.delete_contact(42).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            store.update_contact_status(42, ContactStatus::Closed).await,
            Err(PortError::NotFound(_))
        ));
        assert!(matches!(
            store.get_admin_session("nope").await,
            Err(PortError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn purge_drops_only_old_sessions() {
        let store = MemoryContentStore::new();
        let now = Utc::now();
        store
            .create_admin_session("old", "admin", now - chrono::Duration::hours(30))
            .await
            .unwrap();
        store.create_admin_session("new", "admin", now).await.unwrap();

        let purged = store
            .purge_admin_sessions(now - chrono::Duration::hours(24))
            .await
            .unwrap();
        assert_eq!(purged, 1);
        assert!(store.get_admin_session("old").await.is_err());
        assert!(store.get_admin_session("new").await.is_ok());
    }
}
