//! Linear email to GitHub handle mapping

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Read-only email → GitHub handle table
///
/// Unknown emails resolve to an empty handle rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityMap(HashMap<String, String>);

impl IdentityMap {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self(entries)
    }

    /// GitHub handle for `email`, or `""` when absent or unmapped
    pub fn handle(&self, email: Option<&str>) -> &str {
        email
            .and_then(|email| self.0.get(email))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
