//! crates/site_core/src/domain.rs
//!
//! Defines the core data structures for the site: the content collections
//! managed from the admin surface and the records submitted by visitors.
//! Optional columns are explicit `Option` fields rather than loose maps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Visitor Submissions
//=========================================================================================

/// Follow-up state of a contact submission, tracked from the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Contacted => "contacted",
            ContactStatus::Closed => "closed",
        }
    }

    /// Parses the stored column value. Unknown values fall back to `New`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "contacted" => ContactStatus::Contacted,
            "closed" => ContactStatus::Closed,
            _ => ContactStatus::New,
        }
    }
}

/// A message left through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

/// A star rating left by a client. Highly rated feedback can be promoted
/// to a public testimonial.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub feedback: String,
    pub position: Option<String>,
    pub company: Option<String>,
    pub avatar: Option<String>,
    pub is_testimonial: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl FeedbackSubmission {
    /// Only 4 and 5 star reviews are offered as testimonial candidates.
    pub fn is_testimonial_candidate(&self) -> bool {
        (4..=5).contains(&self.rating) && !self.is_testimonial
    }

    pub fn is_public_testimonial(&self) -> bool {
        self.is_testimonial && self.published
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewFeedbackSubmission {
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub feedback: String,
    pub position: Option<String>,
    pub company: Option<String>,
}

//=========================================================================================
// Published Content
//=========================================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub image: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewBlogPost {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub author: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub read_time: String,
    pub image: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseStudy {
    pub id: i64,
    pub title: String,
    pub client: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    pub results: Vec<String>,
    pub technologies: Vec<String>,
    pub image: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewCaseStudy {
    pub title: String,
    pub client: String,
    pub industry: String,
    pub challenge: String,
    pub solution: String,
    #[serde(default)]
    pub results: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub image: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: i64,
    pub title: String,
    /// Display date as entered by the admin, e.g. "2025-03-14".
    pub date: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub attendees: i32,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewEvent {
    pub title: String,
    pub date: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub image: String,
    #[serde(default)]
    pub attendees: i32,
    #[serde(default)]
    pub published: bool,
}

//=========================================================================================
// Admin
//=========================================================================================

/// The identity remembered for a logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminUser {
    pub username: String,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password_hash: String,
}

/// Counters shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OverviewStats {
    pub total_contacts: i64,
    pub new_contacts: i64,
    pub total_feedback: i64,
    pub avg_rating: f64,
    pub total_blog_posts: i64,
}

impl OverviewStats {
    /// Derives the dashboard counters from the raw collections.
    pub fn from_collections(
        contacts: &[ContactSubmission],
        feedback: &[FeedbackSubmission],
        posts: &[BlogPost],
    ) -> Self {
        let avg_rating = if feedback.is_empty() {
            0.0
        } else {
            let sum: i64 = feedback.iter().map(|f| f.rating as i64).sum();
            sum as f64 / feedback.len() as f64
        };

        Self {
            total_contacts: contacts.len() as i64,
            new_contacts: contacts
                .iter()
                .filter(|c| c.status == ContactStatus::New)
                .count() as i64,
            total_feedback: feedback.len() as i64,
            avg_rating,
            total_blog_posts: posts.iter().filter(|p| p.published).count() as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(rating: i32, is_testimonial: bool) -> FeedbackSubmission {
        FeedbackSubmission {
            id: 1,
            name: "Ana".into(),
            email: "ana@example.com".into(),
            rating,
            feedback: "Great work".into(),
            position: None,
            company: None,
            avatar: None,
            is_testimonial,
            published: is_testimonial,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn only_high_ratings_are_candidates() {
        assert!(feedback(5, false).is_testimonial_candidate());
        assert!(feedback(4, false).is_testimonial_candidate());
        assert!(!feedback(3, false).is_testimonial_candidate());
        assert!(!feedback(5, true).is_testimonial_candidate());
    }

    #[test]
    fn overview_averages_ratings() {
        let stats = OverviewStats::from_collections(&[], &[feedback(5, false), feedback(2, true)], &[]);
        assert_eq!(stats.total_feedback, 2);
        assert!((stats.avg_rating - 3.5).abs() < f64::EPSILON);
        assert_eq!(stats.total_contacts, 0);
    }

    #[test]
    fn unknown_status_reads_as_new() {
        assert_eq!(ContactStatus::from_db("closed"), ContactStatus::Closed);
        assert_eq!(ContactStatus::from_db("archived"), ContactStatus::New);
    }
}
