//! Conversation history - bounded window of recent turns

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{ChatMessage, MessageRole};

/// Number of exchanges retained when nothing else is configured
pub const DEFAULT_MAX_EXCHANGES: usize = 5;

/// Ordered turns of one conversation, bounded to the last N exchanges.
///
/// An exchange is a user turn followed by the assistant's reply, so the
/// history never holds more than `2 * max_exchanges` turns. The oldest turns
/// are evicted first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationHistory {
    max_exchanges: usize,
    turns: VecDeque<ChatMessage>,
}

impl ConversationHistory {
    /// Create an empty history retaining at most `max_exchanges` exchanges
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            max_exchanges,
            turns: VecDeque::with_capacity(max_exchanges.saturating_mul(2)),
        }
    }

    /// Maximum number of exchanges retained
    pub const fn max_exchanges(&self) -> usize {
        self.max_exchanges
    }

    /// Maximum number of turns retained
    pub const fn capacity(&self) -> usize {
        self.max_exchanges.saturating_mul(2)
    }

    /// Append one user/assistant exchange, evicting from the front on overflow
    pub fn record_exchange(&mut self, user: ChatMessage, assistant: ChatMessage) {
        self.turns.push_back(user);
        self.turns.push_back(assistant);
        self.truncate();
    }

    /// Replace the history with the given turns, keeping only the newest ones.
    ///
    /// System turns are dropped; they are carried by the prompt, not the window.
    pub fn seed(&mut self, turns: impl IntoIterator<Item = ChatMessage>) {
        self.turns = turns
            .into_iter()
            .filter(|t| t.role != MessageRole::System)
            .collect();
        self.truncate();
    }

    /// Remove every turn
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turns currently held
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterate over turns, oldest first
    pub fn turns(&self) -> impl ExactSizeIterator<Item = &ChatMessage> {
        self.turns.iter()
    }

    /// Last turn, if any
    pub fn last(&self) -> Option<&ChatMessage> {
        self.turns.back()
    }

    fn truncate(&mut self) {
        let capacity = self.capacity();
        while self.turns.len() > capacity {
            self.turns.pop_front();
        }
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXCHANGES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(history: &mut ConversationHistory, n: usize) {
        history.record_exchange(
            ChatMessage::user(format!("question {n}")),
            ChatMessage::assistant(format!("answer {n}")),
        );
    }

    #[test]
    fn new_history_is_empty() {
        let history = ConversationHistory::new(3);
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert_eq!(history.capacity(), 6);
    }

    #[test]
    fn default_keeps_five_exchanges() {
        let history = ConversationHistory::default();
        assert_eq!(history.max_exchanges(), 5);
    }

    #[test]
    fn exchanges_are_appended_in_order() {
        let mut history = ConversationHistory::new(3);
        exchange(&mut history, 1);

        let turns: Vec<_> = history.turns().collect();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, MessageRole::User);
        assert_eq!(turns[0].content, "question 1");
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert_eq!(turns[1].content, "answer 1");
    }

    #[test]
    fn oldest_exchange_is_evicted_first() {
        let mut history = ConversationHistory::new(2);
        for n in 1..=3 {
            exchange(&mut history, n);
        }

        assert_eq!(history.len(), 4);
        let first = history.turns().next().unwrap();
        assert_eq!(first.content, "question 2");
        assert_eq!(history.last().unwrap().content, "answer 3");
    }

    #[test]
    fn zero_window_keeps_nothing() {
        let mut history = ConversationHistory::new(0);
        exchange(&mut history, 1);
        assert!(history.is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let mut history = ConversationHistory::new(2);
        exchange(&mut history, 1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.last().is_none());
    }

    #[test]
    fn seed_keeps_newest_turns_and_drops_system() {
        let mut history = ConversationHistory::new(1);
        history.seed(vec![
            ChatMessage::system("be nice"),
            ChatMessage::user("a"),
            ChatMessage::assistant("b"),
            ChatMessage::user("c"),
            ChatMessage::assistant("d"),
        ]);

        let contents: Vec<_> = history.turns().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["c", "d"]);
    }
}
