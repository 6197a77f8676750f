//! Mock search client for testing
//!
//! Returns queued results (or errors) without talking to a server.

use super::{NodeSearch, ResultSet};
use crate::error::ChefError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Saved search answers: a full response or just its rows
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedRows {
    Response(ResultSet),
    Rows(Vec<Value>),
}

enum Scripted {
    Result(ResultSet),
    Error(String),
}

/// Mock client that answers from a FIFO queue
pub struct MockSearch {
    /// Queue of answers to return (FIFO)
    queue: Arc<Mutex<VecDeque<Scripted>>>,
    /// Answer when the queue is empty
    default_result: ResultSet,
    /// Every query received (for assertions)
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockSearch {
    /// Create a mock that answers every query with no results
    pub fn new() -> Self {
        Self {
            queue: Arc::new(Mutex::new(VecDeque::new())),
            default_result: ResultSet::default(),
            queries: Arc::new(Mutex::new(vec![])),
        }
    }

    /// Answer every query with a saved search response.
    ///
    /// Accepts either `{"total": N, "rows": [...]}` or a bare array of rows.
    pub fn from_json(json: &str) -> Result<Self, ChefError> {
        let result = match serde_json::from_str(json)? {
            SavedRows::Response(result) => result,
            SavedRows::Rows(rows) => ResultSet::from_rows(rows),
        };
        Ok(Self::new().with_default(result))
    }

    /// Queue a result set
    pub fn with_result(self, result: ResultSet) -> Self {
        self.queue_result(result);
        self
    }

    /// Queue a failure, surfaced as [`ChefError::Api`]
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.lock_queue().push_back(Scripted::Error(message.into()));
        self
    }

    /// Set the answer used once the queue is drained
    pub fn with_default(mut self, result: ResultSet) -> Self {
        self.default_result = result;
        self
    }

    pub fn queue_result(&self, result: ResultSet) {
        self.lock_queue().push_back(Scripted::Result(result));
    }

    /// All queries made to this client
    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Scripted>> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeSearch for MockSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<ResultSet, ChefError> {
        self.queries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(query.to_string());

        let next = self.lock_queue().pop_front();
        match next {
            Some(Scripted::Result(result)) => Ok(result),
            Some(Scripted::Error(message)) => Err(ChefError::Api(message)),
            None => Ok(self.default_result.clone()),
        }
    }
}
