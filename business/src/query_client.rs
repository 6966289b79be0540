//! Cached-query bookkeeping.
//!
//! The client does not hold query data itself; it only records which keyed
//! views are stale. Each invalidation bumps the key's generation and is
//! broadcast to subscribers (list fetchers) so they can refetch.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use flume::{Receiver, Sender};
use log::{debug, info};
use roughcode_states::State;
use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub scope: Ustr,
    pub id: i64,
}

impl CacheKey {
    pub const PROJECT_INFO: &'static str = "projectInfo";
    pub const CODE_INFO: &'static str = "codeInfo";
    pub const CODE_REVIEW_FEEDBACKS: &'static str = "codeReviewFeedbacks";

    pub fn new(scope: &str, id: i64) -> Self {
        Self {
            scope: Ustr::from(scope),
            id,
        }
    }

    pub fn project_info(project_id: i64) -> Self {
        Self::new(Self::PROJECT_INFO, project_id)
    }

    pub fn code_info(code_id: i64) -> Self {
        Self::new(Self::CODE_INFO, code_id)
    }

    pub fn code_review_feedbacks(review_id: i64) -> Self {
        Self::new(Self::CODE_REVIEW_FEEDBACKS, review_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.id)
    }
}

/// How many recent invalidations [`QueryClient::invalidations`] keeps.
pub const INVALIDATION_HISTORY: usize = 32;

/// In-memory query cache state.
#[derive(Debug, Default)]
pub struct QueryClient {
    generations: HashMap<CacheKey, u64>,
    recent: VecDeque<CacheKey>,
    subscribers: Vec<Sender<CacheKey>>,
}

impl State for QueryClient {}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a keyed view stale and notify subscribers.
    pub fn invalidate(&mut self, key: CacheKey) {
        info!("QueryClient: invalidating {key}");
        *self.generations.entry(key).or_insert(0) += 1;
        if self.recent.len() == INVALIDATION_HISTORY {
            self.recent.pop_front();
        }
        self.recent.push_back(key);
        self.subscribers.retain(|sub| sub.send(key).is_ok());
    }

    pub fn invalidate_all(&mut self, keys: impl IntoIterator<Item = CacheKey>) {
        for key in keys {
            self.invalidate(key);
        }
    }

    /// How many times `key` has been invalidated.
    pub fn generation(&self, key: CacheKey) -> u64 {
        self.generations.get(&key).copied().unwrap_or(0)
    }

    /// The latest invalidations, oldest first, at most
    /// [`INVALIDATION_HISTORY`] of them.
    pub fn invalidations(&self) -> Vec<CacheKey> {
        self.recent.iter().copied().collect()
    }

    /// Receive every future invalidation. Dropped receivers are pruned on the
    /// next invalidation.
    pub fn subscribe(&mut self) -> Receiver<CacheKey> {
        let (send, recv) = flume::unbounded();
        self.subscribers.push(send);
        debug!("QueryClient: {} subscriber(s)", self.subscribers.len());
        recv
    }
}
