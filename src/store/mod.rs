//! In-memory poll registry.
//!
//! The store is constructed once at start-up and handed to the session broker.
//! It exclusively owns every poll record, including full vote detail; callers
//! only ever receive clones.

mod poll;
mod vote;

use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct PollStore {
    polls: Arc<RwLock<HashMap<PollId, Poll>>>,
}

impl PollStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live polls
    pub async fn len(&self) -> usize {
        self.polls.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.polls.read().await.is_empty()
    }
}
