//! Keyword responder - Canned replies when no model can answer
//!
//! Rules are checked in table order with case-insensitive substring matching;
//! the first rule with a matching keyword wins. A `*` keyword matches anything.
//! Messages that match no rule get the next reply from a rotating list.

use std::sync::atomic::{AtomicUsize, Ordering};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Keyword that matches every message
pub const CATCH_ALL: &str = "*";

/// Reply used when the table has no default replies
const LAST_RESORT_REPLY: &str = "I'm here to help. Could you tell me a bit more?";

/// One fallback rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Keywords that trigger the rule
    pub keywords: Vec<String>,
    /// Reply returned when a keyword matches
    pub reply: String,
}

impl KeywordRule {
    /// Create a rule
    pub fn new<K: Into<String>>(keywords: impl IntoIterator<Item = K>, reply: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            reply: reply.into(),
        }
    }
}

/// Ordered fallback rules plus generic replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackTable {
    /// Rules in priority order
    #[serde(default = "default_rules")]
    pub rules: Vec<KeywordRule>,
    /// Replies rotated through when no rule matches
    #[serde(default = "default_replies")]
    pub default_replies: Vec<String>,
}

fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            ["hello", "hi", "hey"],
            "Hello! I'm your personal AI assistant. How can I help you today?",
        ),
        KeywordRule::new(
            ["how are you", "how do you feel"],
            "I'm doing well, thank you for asking! I'm here and ready to help.",
        ),
        KeywordRule::new(
            ["what can you do", "help", "capabilities"],
            "I'm currently in development, but I'm designed to be your personal AI assistant. \
             I can chat with you and help with various tasks as I continue to learn!",
        ),
    ]
}

fn default_replies() -> Vec<String> {
    [
        "I'm currently in development mode. How can I help you today?",
        "I'm learning and growing! What would you like to discuss?",
        "I'm here to assist you. What's on your mind?",
        "Thank you for your patience as I develop my capabilities.",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            default_replies: default_replies(),
        }
    }
}

/// Matches messages against a [`FallbackTable`]
pub struct KeywordResponder {
    matcher: Option<AhoCorasick>,
    /// Rule index for each automaton pattern
    pattern_rules: Vec<usize>,
    catch_all: Option<usize>,
    replies: Vec<String>,
    default_replies: Vec<String>,
    next_default: AtomicUsize,
}

impl std::fmt::Debug for KeywordResponder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordResponder")
            .field("rules", &self.replies.len())
            .field("patterns", &self.pattern_rules.len())
            .field("catch_all", &self.catch_all)
            .field("default_replies", &self.default_replies.len())
            .finish_non_exhaustive()
    }
}

impl KeywordResponder {
    /// Compile the table into a matcher
    pub fn new(table: &FallbackTable) -> Result<Self, ApplicationError> {
        let mut patterns = Vec::new();
        let mut pattern_rules = Vec::new();
        let mut catch_all = None;

        for (index, rule) in table.rules.iter().enumerate() {
            for keyword in &rule.keywords {
                let keyword = keyword.trim();
                if keyword == CATCH_ALL {
                    catch_all.get_or_insert(index);
                } else if !keyword.is_empty() {
                    patterns.push(keyword.to_lowercase());
                    pattern_rules.push(index);
                }
            }
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .match_kind(MatchKind::Standard)
                    .build(&patterns)
                    .map_err(|e| {
                        ApplicationError::Configuration(format!("Invalid fallback keywords: {e}"))
                    })?,
            )
        };

        Ok(Self {
            matcher,
            pattern_rules,
            catch_all,
            replies: table.rules.iter().map(|r| r.reply.clone()).collect(),
            default_replies: table
                .default_replies
                .iter()
                .filter(|r| !r.trim().is_empty())
                .cloned()
                .collect(),
            next_default: AtomicUsize::new(0),
        })
    }

    /// Responder with no rules, only rotating replies
    pub fn replies_only(default_replies: Vec<String>) -> Self {
        Self {
            matcher: None,
            pattern_rules: Vec::new(),
            catch_all: None,
            replies: Vec::new(),
            default_replies,
            next_default: AtomicUsize::new(0),
        }
    }

    /// Index of the first rule matching the message
    pub fn matching_rule(&self, message: &str) -> Option<usize> {
        let message = message.to_lowercase();
        let keyword_rule = self.matcher.as_ref().and_then(|matcher| {
            matcher
                .find_overlapping_iter(&message)
                .map(|m| self.pattern_rules[m.pattern().as_usize()])
                .min()
        });

        match (keyword_rule, self.catch_all) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Reply for the message; never empty
    pub fn respond(&self, message: &str) -> String {
        if let Some(rule) = self.matching_rule(message) {
            return self.replies[rule].clone();
        }
        if self.default_replies.is_empty() {
            return LAST_RESORT_REPLY.to_string();
        }
        let n = self.next_default.fetch_add(1, Ordering::Relaxed);
        self.default_replies[n % self.default_replies.len()].clone()
    }
}

impl Default for KeywordResponder {
    fn default() -> Self {
        Self::new(&FallbackTable::default()).unwrap_or_else(|_| Self::replies_only(default_replies()))
    }
}
