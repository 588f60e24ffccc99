//! Query results

use serde::Serialize;
use serde_json::Value;

/// Outcome of a post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostResult {
    /// Final key the record was stored under
    pub key: String,

    /// Always 1
    pub count: usize,
}

/// Outcome of a get or delete
///
/// `key` is present when the lookup returned keys (read or keys mode with at
/// least one hit); `result` only when record bodies were read. Index `i` of
/// `result` belongs to index `i` of `key`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<Value>>,
}

impl QueryResult {
    /// Matched keys, empty if none were returned
    pub fn keys(&self) -> &[String] {
        self.key.as_deref().unwrap_or_default()
    }

    /// Record bodies, empty if none were read
    pub fn records(&self) -> &[Value] {
        self.result.as_deref().unwrap_or_default()
    }
}
