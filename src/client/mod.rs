//! # Node Search Clients
//!
//! The query collaborator behind every `{{chef>...}}` tag.
//!
//! - [`NodeSearch`] - trait for running a node search
//! - [`ChefClient`] - HTTP client for a Chef Server `/search/node` endpoint
//! - [`MockSearch`] - scripted results for tests and offline rendering
//!
//! A client is built once by the caller and passed by reference into every
//! render; nothing here is process-global.
//!
//! ```rust
//! use chefwiki::client::{MockSearch, NodeSearch, ResultSet};
//! use serde_json::json;
//!
//! let mock = MockSearch::new().with_result(ResultSet::from_rows(vec![json!({"name": "web01"})]));
//! assert_eq!(mock.name(), "mock");
//! ```

mod chef;
mod mock;

pub use chef::ChefClient;
pub use mock::MockSearch;

use crate::error::ChefError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

/// Chef search response: `{ "total": N, "start": 0, "rows": [...] }`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub rows: Vec<Value>,
}

impl ResultSet {
    /// Result set whose total is the number of rows
    pub fn from_rows(rows: Vec<Value>) -> Self {
        Self {
            total: rows.len() as u64,
            start: 0,
            rows,
        }
    }

    /// No matches: either the server said so or sent no rows
    pub fn is_empty(&self) -> bool {
        self.total == 0 || self.rows.is_empty()
    }
}

/// Runs node searches against some inventory
#[async_trait]
pub trait NodeSearch: Send + Sync {
    /// Client name for logs (e.g., "chef", "mock")
    fn name(&self) -> &str;

    /// Search nodes matching `query`
    ///
    /// Any error is fatal for the render that asked.
    async fn search(&self, query: &str) -> Result<ResultSet, ChefError>;
}
