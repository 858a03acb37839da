//! `ureq`-backed remote todo source.

use super::{RemoteConfig, RemoteError, RemoteResult, RemoteTodoSource};
use crate::model::remote_item::{RemoteTodoEnvelope, RemoteTodoItem};
use log::{error, info};
use std::time::Instant;
use url::Url;

/// Fetches the seed list with a single blocking GET.
pub struct HttpTodoSource {
    config: RemoteConfig,
    agent: ureq::Agent,
}

impl HttpTodoSource {
    pub fn new(config: RemoteConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            config,
            agent: builder.build(),
        }
    }

    fn request(&self, url: &Url) -> RemoteResult<Vec<RemoteTodoItem>> {
        let response = self
            .agent
            .request_url("GET", url)
            .call()
            .map_err(|err| RemoteError::TransportFailure(Box::new(err)))?;
        let body = response
            .into_string()
            .map_err(|err| RemoteError::TransportFailure(Box::new(err)))?;
        decode_todos(&body)
    }
}

impl Default for HttpTodoSource {
    fn default() -> Self {
        Self::new(RemoteConfig::default())
    }
}

impl RemoteTodoSource for HttpTodoSource {
    fn fetch_todos(&self) -> RemoteResult<Vec<RemoteTodoItem>> {
        let url = Url::parse(self.config.endpoint.trim())
            .map_err(|_| RemoteError::InvalidEndpoint(self.config.endpoint.clone()))?;

        let started_at = Instant::now();
        info!("event=remote_fetch module=remote status=start host={}", url.host_str().unwrap_or("-"));

        match self.request(&url) {
            Ok(items) => {
                info!(
                    "event=remote_fetch module=remote status=ok duration_ms={} items={}",
                    started_at.elapsed().as_millis(),
                    items.len()
                );
                Ok(items)
            }
            Err(err) => {
                error!(
                    "event=remote_fetch module=remote status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Decodes a `{ "todos": [...] }` payload.
///
/// A blank body is [`RemoteError::EmptyResponse`]; anything unparsable is
/// [`RemoteError::DecodeFailure`].
pub fn decode_todos(body: &str) -> RemoteResult<Vec<RemoteTodoItem>> {
    if body.trim().is_empty() {
        return Err(RemoteError::EmptyResponse);
    }
    let envelope: RemoteTodoEnvelope =
        serde_json::from_str(body).map_err(RemoteError::DecodeFailure)?;
    Ok(envelope.todos)
}

#[cfg(test)]
mod tests {
    use super::{decode_todos, HttpTodoSource};
    use crate::remote::{RemoteConfig, RemoteError, RemoteTodoSource};

    #[test]
    fn decode_reads_todos_and_ignores_paging_fields() {
        let body = r#"{
            "todos": [
                {"id": 1, "todo": "Do something nice", "completed": false, "userId": 152},
                {"id": 2, "todo": "Memorize a poem", "completed": true, "userId": 13}
            ],
            "total": 254,
            "skip": 0,
            "limit": 30
        }"#;

        let items = decode_todos(body).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].external_id, 1);
        assert_eq!(items[0].text, "Do something nice");
        assert!(!items[0].completed);
        assert_eq!(items[1].owner_id, 13);
        assert!(items[1].completed);
    }

    #[test]
    fn decode_rejects_blank_body() {
        assert!(matches!(decode_todos("  \n"), Err(RemoteError::EmptyResponse)));
    }

    #[test]
    fn decode_wraps_shape_errors() {
        let err = decode_todos(r#"{"items": []}"#).unwrap_err();
        assert!(matches!(err, RemoteError::DecodeFailure(_)));
        assert!(err.to_string().contains("decode"));
    }

    #[test]
    fn invalid_endpoint_fails_before_any_request() {
        let source = HttpTodoSource::new(RemoteConfig {
            endpoint: "not a url".to_string(),
            timeout: None,
        });
        let err = source.fetch_todos().unwrap_err();
        assert!(matches!(err, RemoteError::InvalidEndpoint(ref value) if value == "not a url"));
    }
}
