use std::collections::VecDeque;

use crate::core::message::Message;

/// Bounded conversation window. Messages are appended in user/assistant
/// pairs after a successful exchange and the oldest pairs are dropped once
/// the window is full. Never persisted across process restarts.
#[derive(Debug)]
pub struct ConversationHistory {
    messages: VecDeque<Message>,
    max_exchanges: usize,
}

impl ConversationHistory {
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            messages: VecDeque::new(),
            max_exchanges: max_exchanges.max(1),
        }
    }

    /// Append a completed exchange. Both messages land together so a failed
    /// turn can never leave the history half-updated.
    pub fn push_exchange(&mut self, user: Message, assistant: Message) {
        self.messages.push_back(user);
        self.messages.push_back(assistant);
        while self.messages.len() > self.max_exchanges * 2 {
            self.messages.pop_front();
            self.messages.pop_front();
        }
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &Message> {
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn max_exchanges(&self) -> usize {
        self.max_exchanges
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Role;

    fn exchange(n: usize) -> (Message, Message) {
        (
            Message::user(format!("question {n}")),
            Message::assistant(format!("answer {n}")),
        )
    }

    #[test]
    fn history_never_exceeds_the_window() {
        let mut history = ConversationHistory::new(3);
        for n in 0..10 {
            let (user, assistant) = exchange(n);
            history.push_exchange(user, assistant);
            assert!(history.len() <= 6);
        }
        assert_eq!(history.len(), 6);
    }

    #[test]
    fn trimming_drops_the_oldest_pairs_first() {
        let mut history = ConversationHistory::new(2);
        for n in 0..4 {
            let (user, assistant) = exchange(n);
            history.push_exchange(user, assistant);
        }
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["question 2", "answer 2", "question 3", "answer 3"]
        );
    }

    #[test]
    fn recent_returns_the_tail_in_order() {
        let mut history = ConversationHistory::new(5);
        for n in 0..3 {
            let (user, assistant) = exchange(n);
            history.push_exchange(user, assistant);
        }
        let tail: Vec<&str> = history.recent(2).map(|m| m.content.as_str()).collect();
        assert_eq!(tail, vec!["question 2", "answer 2"]);
        assert!(history.recent(0).next().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut history = ConversationHistory::new(2);
        let (user, assistant) = exchange(0);
        history.push_exchange(user, assistant);
        history.clear();
        assert!(history.is_empty());
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn exchanges_keep_role_order() {
        let mut history = ConversationHistory::new(2);
        let (user, assistant) = exchange(0);
        history.push_exchange(user, assistant);
        let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn zero_window_is_clamped_to_one_exchange() {
        let mut history = ConversationHistory::new(0);
        for n in 0..3 {
            let (user, assistant) = exchange(n);
            history.push_exchange(user, assistant);
        }
        assert_eq!(history.len(), 2);
    }
}
