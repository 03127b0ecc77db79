//! Retrieval of run logs from HTTP(S) URLs or local paths.
//!
//! All sources are fetched concurrently. The first failure drops every other
//! in-flight request, so a report is built from all logs or from none.

use crate::diagnostics;

use futures::future::try_join_all;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to load log `{source_name}': got {status}")]
    Status {
        source_name: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to load log `{source_name}'")]
    Http {
        source_name: String,
        #[source]
        error: reqwest::Error,
    },

    #[error("Failed to load log `{source_name}'")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },
}

/// Where a run log comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSource {
    Remote(Url),
    Local(PathBuf),
}

impl LogSource {
    /// `http`/`https` URLs are fetched remotely, everything else is a path.
    pub fn parse(s: &str) -> Self {
        match Url::parse(s) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => LogSource::Remote(url),
            _ => LogSource::Local(PathBuf::from(s)),
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSource::Remote(url) => write!(f, "{}", url),
            LogSource::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetch every source, returning texts in the same order as `sources`.
pub async fn fetch_all(sources: &[LogSource]) -> Result<Vec<String>, FetchError> {
    let client = reqwest::Client::new();
    try_join_all(sources.iter().map(|source| fetch_one(&client, source))).await
}

async fn fetch_one(client: &reqwest::Client, source: &LogSource) -> Result<String, FetchError> {
    let source_name = source.to_string();

    let text = match source {
        LogSource::Remote(url) => {
            let response = client
                .get(url.clone())
                .send()
                .await
                .map_err(|error| FetchError::Http {
                    source_name: source_name.clone(),
                    error,
                })?;

            let status = response.status();
            if !status.is_success() {
                diagnostics::error_message(format!(
                    "Failed to load log `{}' got: {}",
                    source_name, status
                ));
                return Err(FetchError::Status {
                    source_name,
                    status,
                });
            }

            response.text().await.map_err(|error| FetchError::Http {
                source_name: source_name.clone(),
                error,
            })?
        }
        LogSource::Local(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|error| FetchError::Io {
                    source_name: source_name.clone(),
                    error,
                })?
        }
    };

    log::info!("fetched {} ({} bytes)", source_name, text.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classifies_sources() {
        assert!(matches!(
            LogSource::parse("https://example.org/logs/run1.txt"),
            LogSource::Remote(_)
        ));
        assert_eq!(
            LogSource::parse("logs/run1.txt"),
            LogSource::Local(PathBuf::from("logs/run1.txt"))
        );
        assert_eq!(
            LogSource::parse("file:///tmp/run.txt"),
            LogSource::Local(PathBuf::from("file:///tmp/run.txt"))
        );
    }

    #[tokio::test]
    async fn fetches_local_logs_in_order() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let first = dir.path().join("first.log");
        let second = dir.path().join("second.log");
        std::fs::write(&first, "one")?;
        std::fs::write(&second, "two")?;

        let texts = fetch_all(&[
            LogSource::Local(second.clone()),
            LogSource::Local(first.clone()),
        ])
        .await?;

        assert_eq!(texts, vec!["two".to_string(), "one".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_is_terminal() -> anyhow::Result<()> {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await?;
            socket
                .write_all(
                    b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await?;
            socket.shutdown().await?;
            Ok::<_, std::io::Error>(())
        });

        let url = format!("http://{}/missing.log", addr);
        let err = fetch_all(&[LogSource::parse(&url)]).await.unwrap_err();

        match err {
            FetchError::Status { source_name, status } => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(source_name, url);
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.await??;
        Ok(())
    }

    #[tokio::test]
    async fn one_failure_fails_everything() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let present = dir.path().join("present.log");
        std::fs::write(&present, "MEMORY STAT resident after test: 1\n")?;
        let missing = dir.path().join("missing.log");

        let err = fetch_all(&[LogSource::Local(present), LogSource::Local(missing)])
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().starts_with("Failed to load log"));
        Ok(())
    }
}
