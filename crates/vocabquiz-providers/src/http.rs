//! HTTP plumbing shared by the network backends.

use std::time::Duration;

use vocabquiz_core::error::AugmentError;

/// Build a client with a whole-request timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, AugmentError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AugmentError::NetworkError(format!("failed to build HTTP client: {e}")))
}

/// Send a request and map transport failures and error statuses.
pub(crate) async fn send(
    request: reqwest::RequestBuilder,
    timeout_secs: u64,
) -> Result<reqwest::Response, AugmentError> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            AugmentError::Timeout(timeout_secs)
        } else {
            AugmentError::NetworkError(e.to_string())
        }
    })?;

    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(AugmentError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 || status == 403 {
        let body = response.text().await.unwrap_or_default();
        return Err(AugmentError::AuthenticationFailed(body));
    }
    if status == 404 {
        let body = response.text().await.unwrap_or_default();
        return Err(AugmentError::ModelNotFound(body));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(AugmentError::ApiError {
            status,
            message: body,
        });
    }

    Ok(response)
}

/// Decode a JSON body, reporting shape mismatches as invalid responses.
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AugmentError> {
    response
        .json::<T>()
        .await
        .map_err(|e| AugmentError::InvalidResponse(format!("failed to parse response: {e}")))
}
