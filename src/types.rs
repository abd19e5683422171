//! Wire types for the Deform document API

use serde::{Deserialize, Serialize};

/// One stored key-value pair, as sent to and received from a collection
///
/// The key travels as the document's `_id`. Extra fields the service adds to
/// responses are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document id (the key)
    #[serde(rename = "_id")]
    pub id: String,
    /// Stored value
    pub value: String,
}

impl Document {
    /// Create a document for `key` holding `value`
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: key.into(),
            value: value.into(),
        }
    }
}
