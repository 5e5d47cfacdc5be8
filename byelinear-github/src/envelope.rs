//! Decoding of GitHub response bodies
//!
//! GitHub reports GraphQL validation failures as HTTP 200 with an `errors`
//! array, so every body is checked for one before it is decoded.

use byelinear_core::{Error, GraphQLResponse, RemoteError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ErrorsOnly {
    #[serde(default)]
    errors: Option<Vec<RemoteError>>,
}

/// Fail with [`Error::RemoteValidation`] when the body carries a non-empty `errors` array
pub(crate) fn check_errors(body: &[u8]) -> Result<()> {
    match serde_json::from_slice::<ErrorsOnly>(body) {
        Ok(ErrorsOnly {
            errors: Some(errors),
        }) if !errors.is_empty() => Err(Error::RemoteValidation(errors)),
        _ => Ok(()),
    }
}

/// Decode a REST body
pub(crate) fn decode_rest<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    check_errors(body)?;
    Ok(serde_json::from_slice(body)?)
}

/// Decode the `data` member of a GraphQL body
pub(crate) fn decode_graphql<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    check_errors(body)?;
    serde_json::from_slice::<GraphQLResponse<T>>(body)?.into_data()
}
