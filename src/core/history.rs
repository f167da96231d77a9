//! Per-user query history.
//!
//! Handlers record what a user just looked up so that continuation commands ("next
//! stage", "Pokémon of my last stage") can recover the context later. The history is
//! bounded per user, most recent entry last.

use crate::core::messaging::UserId;
use std::collections::{HashMap, VecDeque};

/// What kind of lookup a query was.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// A stage lookup
    Stage,
    /// Any other lookup; as a search filter, matches every kind
    Any,
}

/// One remembered lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Lookup kind
    pub kind: QueryKind,
    /// Positional arguments the lookup resolved to
    pub args: Vec<String>,
    /// Keyword arguments the lookup used
    pub kwargs: HashMap<String, String>,
}

impl UserQuery {
    /// A query with positional arguments only.
    #[must_use]
    pub fn new(kind: QueryKind, args: Vec<String>) -> Self {
        Self {
            kind,
            args,
            kwargs: HashMap::new(),
        }
    }
}

/// Bounded per-user history of [`UserQuery`] entries.
#[derive(Debug, Default)]
pub struct QueryHistory {
    capacity: usize,
    per_user: HashMap<UserId, VecDeque<UserQuery>>,
}

impl QueryHistory {
    /// Creates a history keeping at most `capacity` entries per user.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            per_user: HashMap::new(),
        }
    }

    /// Appends a query, discarding the oldest once over capacity.
    pub fn push(&mut self, user: UserId, query: UserQuery) {
        let entries = self.per_user.entry(user).or_default();
        entries.push_back(query);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Most recent query of `kind` for the user; [`QueryKind::Any`] matches all kinds.
    #[must_use]
    pub fn last_of(&self, user: UserId, kind: QueryKind) -> Option<&UserQuery> {
        self.per_user
            .get(&user)?
            .iter()
            .rev()
            .find(|q| kind == QueryKind::Any || q.kind == kind)
    }

    /// Number of entries remembered for the user.
    #[must_use]
    pub fn len_for(&self, user: UserId) -> usize {
        self.per_user.get(&user).map_or(0, VecDeque::len)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    fn stage(index: &str) -> UserQuery {
        UserQuery::new(QueryKind::Stage, vec![index.to_string()])
    }

    #[test]
    fn test_last_of_searches_backwards_by_kind() {
        let mut history = QueryHistory::new(5);
        history.push(1, stage("10"));
        history.push(1, UserQuery::new(QueryKind::Any, vec!["Pikachu".to_string()]));

        assert_eq!(history.last_of(1, QueryKind::Stage).unwrap().args, vec!["10"]);
        assert_eq!(history.last_of(1, QueryKind::Any).unwrap().args, vec!["Pikachu"]);
        assert!(history.last_of(2, QueryKind::Any).is_none());
    }

    #[test]
    fn test_history_is_bounded_per_user() {
        let mut history = QueryHistory::new(2);
        history.push(1, stage("1"));
        history.push(1, stage("2"));
        history.push(1, stage("3"));
        history.push(2, stage("9"));

        assert_eq!(history.len_for(1), 2);
        assert_eq!(history.len_for(2), 1);
        assert_eq!(history.last_of(1, QueryKind::Stage).unwrap().args, vec!["3"]);
    }
}
