//! HTTP access to the source dataset and the published artifact.

use crate::config::Config;
use crate::error::{FetchError, FetchResult};
use crate::logs::log_warning;
use crate::models::PublishedArtifact;
use crate::snapshot::{ArtifactSource, PriorArtifact};

/// Anything that can provide the raw source CSV bytes.
#[allow(async_fn_in_trait)]
pub trait SourceFetcher {
    async fn fetch_source(&self) -> FetchResult<Vec<u8>>;
}

/// reqwest-backed fetcher for both endpoints
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    source_url: String,
    artifact_url: String,
}

impl HttpFetcher {
    pub fn new(source_url: impl Into<String>, artifact_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), source_url, artifact_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        source_url: impl Into<String>,
        artifact_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            source_url: source_url.into(),
            artifact_url: artifact_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.source_url.clone(), config.artifact_url.clone())
    }

    /// GET a URL and return the body of a 2xx response
    async fn get_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        Ok(body.to_vec())
    }

    /// Fetch and parse the published artifact
    pub async fn get_artifact(&self) -> FetchResult<PublishedArtifact> {
        let body = self.get_bytes(&self.artifact_url).await?;
        parse_artifact(&body, &self.artifact_url)
    }
}

impl SourceFetcher for HttpFetcher {
    async fn fetch_source(&self) -> FetchResult<Vec<u8>> {
        self.get_bytes(&self.source_url).await
    }
}

impl ArtifactSource for HttpFetcher {
    async fn fetch_artifact(&self) -> PriorArtifact {
        match self.get_artifact().await {
            Ok(artifact) => PriorArtifact::Found(artifact),
            Err(e) => {
                log_warning(format!("No previous artifact: {}", e));
                PriorArtifact::NotFound(e.to_string())
            }
        }
    }
}

/// Parse an artifact body
pub fn parse_artifact(body: &[u8], url: &str) -> FetchResult<PublishedArtifact> {
    serde_json::from_slice(body).map_err(|e| FetchError::InvalidJson {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer the next `requests` connections with a fixed status line
    fn serve(status_line: &'static str, requests: usize) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            for stream in listener.incoming().take(requests) {
                let mut stream = stream.unwrap();
                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 512];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = stream.read(&mut buf).unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                let response = format!(
                    "{status_line}\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found"
                );
                stream.write_all(response.as_bytes()).unwrap();
            }
        });

        format!("http://{addr}")
    }

    fn local_fetcher(base: &str) -> HttpFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpFetcher::with_client(
            client,
            format!("{base}/source.csv"),
            format!("{base}/v1/shelters.json"),
        )
    }

    #[test]
    fn test_parse_artifact() {
        let body = r#"{
            "version": "1.3",
            "updatedAt": "2024-05-01T12:00:00.000Z",
            "shelters": [{
                "type": 0,
                "name": "A",
                "address": "千葉市中央区",
                "postalCode": "260-0001",
                "coordinate": { "latitude": 35.6, "longitude": null }
            }],
            "shelterTypes": [{ "id": 0, "name": "指定避難所", "description": "" }]
        }"#
        .as_bytes();

        let artifact = parse_artifact(body, "https://example.invalid/v1/shelters.json").unwrap();

        assert_eq!(artifact.version, "1.3");
        assert_eq!(artifact.shelters.len(), 1);
        assert!(artifact.shelters[0].coordinate.longitude.is_nan());
        assert_eq!(artifact.shelter_types[0].name, "指定避難所");
    }

    #[test]
    fn test_parse_artifact_rejects_other_shapes() {
        let err = parse_artifact(b"<html>404</html>", "https://example.invalid").unwrap_err();
        assert!(matches!(err, FetchError::InvalidJson { .. }));

        let err = parse_artifact(br#"{"version": "1.0"}"#, "https://example.invalid").unwrap_err();
        assert!(err.to_string().contains("example.invalid"));
    }

    #[tokio::test]
    async fn test_http_404() {
        let fetcher = local_fetcher(&serve("HTTP/1.1 404 Not Found", 2));

        let prior = fetcher.fetch_artifact().await;
        assert!(matches!(&prior, PriorArtifact::NotFound(reason) if reason.contains("404")));

        match fetcher.fetch_source().await {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 404);
                assert!(url.ends_with("/source.csv"));
            }
            other => panic!("expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_artifact_is_not_found() {
        // Nothing listens on port 9 of the loopback interface
        let fetcher = HttpFetcher::new("http://127.0.0.1:9/source.csv", "http://127.0.0.1:9/v1/shelters.json");

        assert!(!fetcher.fetch_artifact().await.is_found());
        assert!(matches!(
            fetcher.fetch_source().await,
            Err(FetchError::Transport { .. })
        ));
    }
}
