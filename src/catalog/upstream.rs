use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned HTTP status {0}")]
    Status(u16),
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Run `fut` for at most `limit`. On expiry the future is dropped, which
/// cancels any request it has in flight.
pub async fn with_timeout<T, F>(limit: Duration, fut: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(UpstreamError::Timeout(limit)),
    }
}

/// Send a GET and decode a JSON body. Non-2xx responses are errors.
pub async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    limit: Duration,
) -> Result<T, UpstreamError> {
    with_timeout(limit, async move {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    })
    .await
}

/// Render a loosely typed upstream field as a string. Strings pass through,
/// numbers are printed, and null or absent values become empty.
pub fn json_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Like `json_to_string`, but zero and `false` also count as missing.
pub fn json_to_string_or_empty(value: &Value) -> String {
    match value {
        Value::Bool(false) => String::new(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        other => json_to_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result: Result<(), _> = with_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(UpstreamError::Timeout(d)) if d == Duration::from_millis(20)));
    }

    #[tokio::test]
    async fn test_with_timeout_passes_result_through() {
        let ok = with_timeout(Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<(), _> =
            with_timeout(Duration::from_secs(1), async { Err(UpstreamError::Status(503)) }).await;
        assert!(matches!(err, Err(UpstreamError::Status(503))));
    }

    #[test]
    fn test_json_to_string() {
        assert_eq!(json_to_string(&Value::Null), "");
        assert_eq!(json_to_string(&serde_json::json!("8.5")), "8.5");
        assert_eq!(json_to_string(&serde_json::json!(12345)), "12345");
        assert_eq!(json_to_string(&serde_json::json!(2024)), "2024");
    }

    #[test]
    fn test_json_to_string_or_empty() {
        assert_eq!(json_to_string_or_empty(&serde_json::json!(0)), "");
        assert_eq!(json_to_string_or_empty(&serde_json::json!(0.0)), "");
        assert_eq!(json_to_string_or_empty(&Value::Null), "");
        assert_eq!(json_to_string_or_empty(&serde_json::json!("")), "");
        assert_eq!(json_to_string_or_empty(&serde_json::json!("0")), "0");
        assert_eq!(json_to_string_or_empty(&serde_json::json!(7.5)), "7.5");
        assert_eq!(json_to_string_or_empty(&serde_json::json!(2023)), "2023");
    }

    #[test]
    fn test_status_message_mentions_code() {
        assert_eq!(
            UpstreamError::Status(503).to_string(),
            "upstream returned HTTP status 503"
        );
        assert_eq!(
            UpstreamError::Timeout(Duration::from_secs(10)).to_string(),
            "upstream request timed out after 10s"
        );
    }
}
