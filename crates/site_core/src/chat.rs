//! crates/site_core/src/chat.rs
//!
//! The FAQ chatbot: the ordered response chain (quick replies, FAQ match,
//! small talk, generic fallback) and the in-memory message log of one chat.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use utoipa::ToSchema;

use crate::faq::{find_best_match, FaqEntry, KNOWLEDGE_BASE};

//=========================================================================================
// Canned Texts
//=========================================================================================

pub const GREETING: &str = "Hello! I'm your AI assistant. I can help you with questions about our services, pricing, implementation process, and more. How can I assist you today?";

/// Quick-reply labels and their canned responses, checked before the FAQ.
pub const QUICK_REPLIES: &[(&str, &str)] = &[
    (
        "Our Services",
        "We offer AI Strategy & Consulting, Machine Learning Solutions, Data Analytics & BI, Chatbots & NLP, AI Security & Ethics, and Process Automation. Which service interests you most?",
    ),
    (
        "Pricing Information",
        "Our pricing is customized based on your specific needs. Factors include project scope, complexity, and timeline. Would you like to schedule a consultation for a detailed quote?",
    ),
    (
        "Implementation Process",
        "Our implementation follows a structured approach: 1) Consultation & Assessment, 2) Strategy Development, 3) Solution Design, 4) Development & Testing, 5) Deployment, 6) Training & Support. Which phase would you like to know more about?",
    ),
    (
        "Contact Sales",
        "You can reach our sales team directly: Email: snehasama7@gmail.com, Phone: +977 981-8032829, or use our contact form. We typically respond within 24 hours.",
    ),
];

pub const GREETING_REPLY: &str = "Hello! How can I help you today? I can answer questions about our AI services, pricing, implementation, and more.";
pub const THANKS_REPLY: &str = "You're welcome! Is there anything else I can help you with regarding our AI solutions?";
pub const FAREWELL_REPLY: &str = "Thank you for your interest in AI-Solutions! Feel free to contact us anytime at snehasama7@gmail.com or +977 981-8032829. Have a great day!";
pub const FALLBACK_REPLY: &str = "I'd be happy to help! I can provide information about our AI services, pricing, implementation process, and more. You can also contact our team directly at snehasama7@gmail.com or +977 981-8032829 for personalized assistance.";

const SERVICE_OPTIONS: &[&str] = &[
    "AI Strategy",
    "Machine Learning",
    "Data Analytics",
    "Chatbots",
    "Security",
    "Automation",
];
const PHASE_OPTIONS: &[&str] = &[
    "Consultation",
    "Strategy",
    "Design",
    "Development",
    "Deployment",
    "Support",
];

//=========================================================================================
// Response Chain
//=========================================================================================

/// Produces the bot's reply for a user message using the default knowledge base.
pub fn respond(message: &str) -> &'static str {
    respond_with(KNOWLEDGE_BASE, message)
}

/// Produces the bot's reply for a user message.
///
/// Precedence: exact quick-reply label, FAQ match, greeting, thanks,
/// farewell, generic fallback.
pub fn respond_with(entries: &'static [FaqEntry], message: &str) -> &'static str {
    if let Some((_, reply)) = QUICK_REPLIES.iter().find(|(label, _)| *label == message) {
        return reply;
    }

    if let Some(entry) = find_best_match(entries, message) {
        return entry.answer;
    }

    let input = message.to_lowercase();
    if ["hello", "hi", "hey"].iter().any(|w| input.contains(w)) {
        return GREETING_REPLY;
    }
    if input.contains("thank") {
        return THANKS_REPLY;
    }
    if ["bye", "goodbye"].iter().any(|w| input.contains(w)) {
        return FAREWELL_REPLY;
    }

    FALLBACK_REPLY
}

/// Follow-up buttons offered under a reply to typed input.
fn follow_up_options(reply: &str) -> Option<Vec<String>> {
    let options = if reply.contains("Which service interests you") {
        SERVICE_OPTIONS
    } else if reply.contains("Which phase would you like") {
        PHASE_OPTIONS
    } else {
        return None;
    };
    Some(options.iter().map(|o| o.to_string()).collect())
}

//=========================================================================================
// Chat Session
//=========================================================================================

/// How a user message entered the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    Typed,
    /// A click on one of the option buttons under a bot message.
    Option,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub id: u64,
    pub text: String,
    pub is_bot: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// Simulated "typing" pause before a bot reply is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypingDelay {
    pub base: Duration,
    pub jitter: Duration,
    pub option: Duration,
}

impl Default for TypingDelay {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(1000),
            jitter: Duration::from_millis(1000),
            option: Duration::from_millis(800),
        }
    }
}

impl TypingDelay {
    pub const NONE: TypingDelay = TypingDelay {
        base: Duration::ZERO,
        jitter: Duration::ZERO,
        option: Duration::ZERO,
    };

    /// `roll` is a uniform sample in `[0, 1)`; it only affects typed input.
    pub fn for_origin(&self, origin: Origin, roll: f64) -> Duration {
        match origin {
            Origin::Typed => self.base + self.jitter.mul_f64(roll.clamp(0.0, 1.0)),
            Origin::Option => self.option,
        }
    }
}

/// The message log of one open chat window.
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// Opens a chat with the bot's greeting and the quick-reply labels.
    pub fn new() -> Self {
        let greeting = ChatMessage {
            id: 1,
            text: GREETING.to_string(),
            is_bot: true,
            timestamp: Utc::now(),
            options: Some(QUICK_REPLIES.iter().map(|(label, _)| label.to_string()).collect()),
        };
        Self {
            messages: vec![greeting],
            next_id: 2,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Records a user message. Blank input is ignored and returns `None`.
    pub fn submit(&mut self, text: &str) -> Option<ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }
        Some(self.push(text.to_string(), false, None))
    }

    /// Generates and records the bot reply to `text`.
    pub fn reply(&mut self, text: &str, origin: Origin) -> ChatMessage {
        let reply = respond(text);
        let options = match origin {
            Origin::Typed => follow_up_options(reply),
            Origin::Option => None,
        };
        self.push(reply.to_string(), true, options)
    }

    fn push(&mut self, text: String, is_bot: bool, options: Option<Vec<String>>) -> ChatMessage {
        let message = ChatMessage {
            id: self.next_id,
            text,
            is_bot,
            timestamp: Utc::now(),
            options,
        };
        self.next_id += 1;
        self.messages.push(message.clone());
        message
    }
}
