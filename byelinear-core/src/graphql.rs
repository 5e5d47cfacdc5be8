//! GraphQL request envelope and execution over a [`Transport`]

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, RemoteError, Result};
use crate::transport::{RawResponse, Transport};

/// A GraphQL query or mutation with its variables
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl GraphQLRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: Map::new(),
        }
    }

    /// Set a variable
    pub fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Set a variable only when `value` is present
    pub fn optional_variable<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.variable(name, value),
            None => self,
        }
    }
}

/// Standard `{data, errors}` response envelope
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<RemoteError>>,
}

impl<T> GraphQLResponse<T> {
    /// Take `data`, failing when it is absent
    pub fn into_data(self) -> Result<T> {
        self.data
            .ok_or_else(|| Error::Parse("GraphQL response missing data".to_string()))
    }
}

/// POST `{query, variables}` to `endpoint` and return the raw response
pub async fn execute<T: Transport + ?Sized>(
    transport: &T,
    endpoint: &str,
    request: &GraphQLRequest,
) -> Result<RawResponse> {
    debug!(endpoint, variables = ?request.variables, "Executing GraphQL request");
    let body = serde_json::to_value(request)?;
    transport.send(Method::POST, endpoint, Some(&body)).await
}
