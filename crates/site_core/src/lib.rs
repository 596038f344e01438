pub mod chat;
pub mod domain;
pub mod faq;
pub mod pagination;
pub mod ports;
pub mod session;

pub use chat::{respond, ChatMessage, ChatSession, Origin, TypingDelay};
pub use domain::{
    AdminCredentials, AdminUser, BlogPost, CaseStudy, ContactStatus, ContactSubmission, Event,
    FeedbackSubmission, NewBlogPost, NewCaseStudy, NewContactSubmission, NewEvent,
    NewFeedbackSubmission, OverviewStats,
};
pub use faq::{find_best_match, FaqEntry, KNOWLEDGE_BASE};
pub use pagination::{PageMeta, PaginationError, Paginator};
pub use ports::{ContentStore, CredentialVerifier, PortError, PortResult, SessionStorage};
pub use session::{AuthState, MemoryStorage, SessionRecord, SessionStore};
