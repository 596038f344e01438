//! crates/site_core/src/faq.rs
//!
//! The chat widget's knowledge base and the keyword matcher that picks an
//! answer for a free-text question.

use serde::Serialize;

/// A static question/answer entry tagged with match keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
    pub keywords: &'static [&'static str],
    pub category: &'static str,
}

impl FaqEntry {
    /// Sum of the lengths of every keyword contained in `normalized`.
    ///
    /// `normalized` must already be lower-cased. Containment is a plain
    /// substring test, so "chi" inside "machine" counts.
    pub fn score(&self, normalized: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| normalized.contains(&keyword.to_lowercase()))
            .map(|keyword| keyword.len())
            .sum()
    }
}

/// Returns the entry with the highest positive score, or `None`.
///
/// Ties keep the entry declared first.
pub fn find_best_match<'a>(entries: &'a [FaqEntry], input: &str) -> Option<&'a FaqEntry> {
    let normalized = input.to_lowercase();
    let mut best_match = None;
    let mut highest_score = 0;

    for entry in entries {
        let score = entry.score(&normalized);
        if score > highest_score {
            highest_score = score;
            best_match = Some(entry);
        }
    }

    best_match
}

pub const KNOWLEDGE_BASE: &[FaqEntry] = &[
    FaqEntry {
        question: "What AI services do you offer?",
        answer: "We offer comprehensive AI services including AI Strategy & Consulting, Machine Learning Solutions, Data Analytics & BI, Chatbots & NLP, AI Security & Ethics, and Process Automation. Each service is tailored to meet your specific business needs.",
        keywords: &["services", "ai services", "what do you offer", "solutions"],
        category: "services",
    },
    FaqEntry {
        question: "How much do your services cost?",
        answer: "Our pricing varies based on project scope, complexity, and duration. We offer flexible pricing models including project-based, hourly rates, and retainer agreements. Contact us for a personalized quote based on your specific requirements.",
        keywords: &["price", "cost", "pricing", "how much", "budget"],
        category: "pricing",
    },
    FaqEntry {
        question: "How long does implementation take?",
        answer: "Implementation timelines vary by project complexity. Simple chatbot implementations can take 2-4 weeks, while comprehensive AI strategy implementations may take 3-6 months. We provide detailed timelines during our initial consultation.",
        keywords: &["timeline", "how long", "implementation", "duration", "time"],
        category: "implementation",
    },
    FaqEntry {
        question: "Do you provide ongoing support?",
        answer: "Yes! We provide 24/7 technical support, regular system monitoring, performance optimization, and maintenance services. Our support packages are designed to ensure your AI solutions continue to deliver value.",
        keywords: &["support", "maintenance", "ongoing", "help", "assistance"],
        category: "support",
    },
    FaqEntry {
        question: "What industries do you work with?",
        answer: "We work across various industries including healthcare, finance, manufacturing, retail, technology, and more. Our AI solutions are adaptable to different industry requirements and compliance standards.",
        keywords: &["industries", "sectors", "healthcare", "finance", "manufacturing", "retail"],
        category: "industries",
    },
    FaqEntry {
        question: "How do you ensure data security?",
        answer: "We implement enterprise-grade security measures including data encryption, secure access controls, compliance with GDPR and other regulations, regular security audits, and secure cloud infrastructure.",
        keywords: &["security", "data protection", "privacy", "gdpr", "compliance", "safe"],
        category: "security",
    },
    FaqEntry {
        question: "Can you integrate with existing systems?",
        answer: "Absolutely! We specialize in seamless integration with existing business systems, databases, CRMs, ERPs, and third-party applications. We ensure minimal disruption to your current operations.",
        keywords: &["integration", "existing systems", "compatibility", "connect", "apis"],
        category: "integration",
    },
    FaqEntry {
        question: "Do you offer training for our team?",
        answer: "Yes, we provide comprehensive training programs for your team including technical training for IT staff, user training for end-users, and executive briefings for leadership teams.",
        keywords: &["training", "education", "learn", "team training", "workshops"],
        category: "training",
    },
    FaqEntry {
        question: "What is your success rate?",
        answer: "We maintain a 98% client satisfaction rate with over 50+ successful AI implementations. Our clients typically see ROI within the first quarter of deployment.",
        keywords: &["success rate", "track record", "results", "roi", "satisfaction"],
        category: "results",
    },
    FaqEntry {
        question: "How do I get started?",
        answer: "Getting started is easy! Contact Sneha Yadav at snehasama7@gmail.com or call +977 981-8032829 to schedule a free consultation. We'll assess your needs and provide a customized proposal.",
        keywords: &["get started", "begin", "contact", "consultation", "first step"],
        category: "contact",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHA: FaqEntry = FaqEntry {
        question: "alpha?",
        answer: "alpha answer",
        keywords: &["abcd"],
        category: "a",
    };
    const BETA: FaqEntry = FaqEntry {
        question: "beta?",
        answer: "beta answer",
        keywords: &["wx", "yz"],
        category: "b",
    };
    const GAMMA: FaqEntry = FaqEntry {
        question: "gamma?",
        answer: "gamma answer",
        keywords: &["longer keyword"],
        category: "c",
    };

    #[test]
    fn single_record_keyword_matches_that_record() {
        let entries = [ALPHA, BETA, GAMMA];
        let found = find_best_match(&entries, "I only say ABCD here").unwrap();
        assert_eq!(found.answer, "alpha answer");
    }

    #[test]
    fn strictly_greater_score_wins() {
        let entries = [ALPHA, GAMMA];
        let found = find_best_match(&entries, "abcd and a longer keyword").unwrap();
        assert_eq!(found.answer, "gamma answer");
    }

    #[test]
    fn tie_keeps_first_declared_record() {
        // both score 4
        let entries = [BETA, ALPHA];
        let found = find_best_match(&entries, "abcd wx yz").unwrap();
        assert_eq!(found.answer, "beta answer");

        let entries = [ALPHA, BETA];
        let found = find_best_match(&entries, "abcd wx yz").unwrap();
        assert_eq!(found.answer, "alpha answer");
    }

    #[test]
    fn no_keyword_means_no_match() {
        assert!(find_best_match(KNOWLEDGE_BASE, "xyz123").is_none());
        assert!(find_best_match(&[], "pricing").is_none());
    }

    #[test]
    fn matching_is_substring_based() {
        // "time" is contained in "sometimes"
        let found = find_best_match(KNOWLEDGE_BASE, "Sometimes").unwrap();
        assert_eq!(found.category, "implementation");
    }

    #[test]
    fn knowledge_base_answers_pricing() {
        let found = find_best_match(KNOWLEDGE_BASE, "What is the PRICE of this?").unwrap();
        assert_eq!(found.category, "pricing");
    }
}
