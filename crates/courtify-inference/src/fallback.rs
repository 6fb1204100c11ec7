//! Local rule-based responder used when the remote service is unavailable.
//!
//! Every operation here is pure, deterministic and total. There is no local
//! document understanding: `analyze_fallback` returns the same generic
//! summary for every document.

use courtify_core::{AnalysisResult, ChatReply};

/// A keyword-triggered canned answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeRule {
    /// Lowercase substrings; any one matching triggers the rule.
    pub triggers: &'static [&'static str],
    pub content: &'static str,
    pub reference: &'static str,
    pub sources: &'static [&'static str],
}

impl KnowledgeRule {
    /// Whether the case-folded query hits any trigger. An empty trigger set
    /// matches everything.
    pub fn matches(&self, normalized_query: &str) -> bool {
        self.triggers.is_empty()
            || self
                .triggers
                .iter()
                .any(|trigger| normalized_query.contains(trigger))
    }

    pub fn reply(&self) -> ChatReply {
        ChatReply {
            content: self.content.to_string(),
            reference: Some(self.reference.to_string()),
            sources: Some(self.sources.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Reference label of the catch-all rule.
pub const GENERAL_GUIDANCE_REFERENCE: &str = "General Legal Guidance";

/// Rules in priority order. The last entry is the catch-all.
pub static KNOWLEDGE_RULES: &[KnowledgeRule] = &[
    KnowledgeRule {
        triggers: &["fundamental right", "article 14", "equality"],
        content: "Article 14 of the Indian Constitution guarantees the Right to Equality. It states that \"The State shall not deny to any person equality before the law or the equal protection of the laws within the territory of India.\" This means all citizens are equal before law regardless of their religion, race, caste, sex, or place of birth. This fundamental right ensures equal treatment and prevents discrimination by the State.",
        reference: "Article 14 - Right to Equality",
        sources: &["Article 14"],
    },
    KnowledgeRule {
        triggers: &["free speech", "article 19", "expression"],
        content: "Article 19(1)(a) of the Indian Constitution guarantees freedom of speech and expression to all citizens. However, this right is subject to reasonable restrictions under Article 19(2) in the interests of sovereignty, integrity, security of State, friendly relations with foreign States, public order, decency, morality, contempt of court, defamation, or incitement to offence. The Supreme Court has held this to be one of the most important fundamental rights in a democracy.",
        reference: "Article 19 - Freedom of Speech and Expression",
        sources: &["Article 19"],
    },
    KnowledgeRule {
        triggers: &["directive principle", "article 38", "welfare"],
        content: "Article 38 is a Directive Principle of State Policy that directs the State to promote the welfare of the people by securing a social order in which justice - social, economic and political - informs all institutions of national life. While not enforceable in courts, these principles are fundamental in governance and it is the duty of the State to apply these principles in making laws.",
        reference: "Article 38 - Directive Principles of State Policy",
        sources: &["Article 38"],
    },
    KnowledgeRule {
        triggers: &["preamble", "constitution purpose"],
        content: "The Preamble to the Indian Constitution declares India to be a SOVEREIGN SOCIALIST SECULAR DEMOCRATIC REPUBLIC. It secures JUSTICE (social, economic, political), LIBERTY (of thought, expression, belief, faith, worship), EQUALITY (of status and opportunity), and FRATERNITY (assuring dignity of individual and unity of nation). The Preamble reflects the philosophy and fundamental values upon which the Constitution is based.",
        reference: "Preamble - Constitution of India",
        sources: &["Preamble"],
    },
    KnowledgeRule {
        triggers: &[],
        content: "I understand you have a question about Indian law. While I can provide general constitutional guidance, for specific legal matters I recommend consulting with a qualified lawyer. I can help explain constitutional provisions, fundamental rights, directive principles, and general legal concepts. Could you please specify which aspect of Indian constitutional law you'd like to know about?",
        reference: GENERAL_GUIDANCE_REFERENCE,
        sources: &[],
    },
];

const FALLBACK_SUMMARY: &str = "This legal document appears to outline terms and conditions between parties, with standard legal provisions including definitions, obligations, rights, remedies, dispute resolution, and termination conditions.";

const FALLBACK_KEY_POINTS: &[&str] = &[
    "Contains binding legal obligations for parties",
    "Specifies dispute resolution and jurisdiction",
    "Includes indemnification and liability clauses",
    "Outlines termination conditions and notices",
    "References applicable laws and compliance",
    "Contains confidentiality provisions",
];

/// Deterministic responder over an ordered rule table.
#[derive(Debug, Clone, Copy)]
pub struct LocalKnowledgeResponder {
    rules: &'static [KnowledgeRule],
}

impl Default for LocalKnowledgeResponder {
    fn default() -> Self {
        Self {
            rules: KNOWLEDGE_RULES,
        }
    }
}

impl LocalKnowledgeResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom rule table. A table without a catch-all still answers
    /// unmatched queries with the built-in general guidance.
    pub fn with_rules(rules: &'static [KnowledgeRule]) -> Self {
        Self { rules }
    }

    /// Answer a query from the first matching rule.
    pub fn chat(&self, query: &str) -> ChatReply {
        let normalized = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .or_else(|| KNOWLEDGE_RULES.last())
            .map(KnowledgeRule::reply)
            .unwrap_or_else(|| ChatReply {
                content: GENERAL_GUIDANCE_REFERENCE.to_string(),
                reference: Some(GENERAL_GUIDANCE_REFERENCE.to_string()),
                sources: None,
            })
    }

    /// The generic summary returned for any document.
    pub fn analyze_fallback(&self) -> AnalysisResult {
        AnalysisResult {
            summary: FALLBACK_SUMMARY.to_string(),
            key_points: FALLBACK_KEY_POINTS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_14_question() {
        let reply = LocalKnowledgeResponder::new().chat("What does Article 14 say about equality?");
        assert!(reply.reference.unwrap().contains("Article 14"));
        assert!(reply.content.contains("Right to Equality"));
        assert_eq!(reply.sources, Some(vec!["Article 14".to_string()]));
    }

    #[test]
    fn test_gibberish_hits_catch_all() {
        let reply = LocalKnowledgeResponder::new().chat("asdkjhasdkjh");
        assert_eq!(reply.reference.as_deref(), Some(GENERAL_GUIDANCE_REFERENCE));
        assert!(!reply.content.is_empty());
        assert_eq!(reply.sources, Some(vec![]));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let responder = LocalKnowledgeResponder::new();
        let reply = responder.chat("FREE SPEECH limits?");
        assert_eq!(
            reply.reference.as_deref(),
            Some("Article 19 - Freedom of Speech and Expression")
        );
    }

    #[test]
    fn test_first_match_wins() {
        // "equality" (rule 1) and "preamble" (rule 4) both present
        let reply = LocalKnowledgeResponder::new().chat("Does the preamble mention equality?");
        assert_eq!(reply.reference.as_deref(), Some("Article 14 - Right to Equality"));
    }

    #[test]
    fn test_each_rule_reachable() {
        let responder = LocalKnowledgeResponder::new();
        let cases = [
            ("tell me about fundamental rights", "Article 14 - Right to Equality"),
            ("article 19 please", "Article 19 - Freedom of Speech and Expression"),
            ("what is a directive principle", "Article 38 - Directive Principles of State Policy"),
            ("social welfare", "Article 38 - Directive Principles of State Policy"),
            ("constitution purpose", "Preamble - Constitution of India"),
        ];
        for (query, expected) in cases {
            assert_eq!(responder.chat(query).reference.as_deref(), Some(expected), "{}", query);
        }
    }

    #[test]
    fn test_chat_is_total() {
        let responder = LocalKnowledgeResponder::new();
        for query in ["", "   ", "🙂", "\n\t", "Article 21"] {
            let reply = responder.chat(query);
            assert!(!reply.content.is_empty());
            assert!(reply.reference.is_some());
        }
    }

    #[test]
    fn test_chat_is_deterministic() {
        let responder = LocalKnowledgeResponder::new();
        assert_eq!(responder.chat("welfare"), responder.chat("welfare"));
    }

    #[test]
    fn test_custom_table_without_catch_all() {
        static RULES: &[KnowledgeRule] = &[KnowledgeRule {
            triggers: &["bail"],
            content: "Bail is governed by the BNSS.",
            reference: "Bail",
            sources: &[],
        }];
        let responder = LocalKnowledgeResponder::with_rules(RULES);
        assert_eq!(responder.chat("bail?").reference.as_deref(), Some("Bail"));
        assert_eq!(
            responder.chat("other").reference.as_deref(),
            Some(GENERAL_GUIDANCE_REFERENCE)
        );
    }

    #[test]
    fn test_catch_all_is_last_rule() {
        let last = KNOWLEDGE_RULES.last().unwrap();
        assert!(last.triggers.is_empty());
        assert_eq!(last.reference, GENERAL_GUIDANCE_REFERENCE);
    }

    #[test]
    fn test_analyze_fallback_fixed() {
        let responder = LocalKnowledgeResponder::new();
        let result = responder.analyze_fallback();
        assert!(result.summary.starts_with("This legal document appears"));
        assert_eq!(result.key_points.len(), 6);
        assert_eq!(result.key_points[0], "Contains binding legal obligations for parties");
        assert_eq!(result, responder.analyze_fallback());
    }
}
