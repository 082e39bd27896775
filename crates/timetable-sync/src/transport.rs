//! Network transport for calendar requests.
//!
//! The authentication task only needs a status code back, so the transport
//! seam is a single `execute` call. [`ReqwestTransport`] is the real
//! implementation; tests substitute their own.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace};

use crate::error::{SyncError, SyncResult};
use crate::request::HttpRequest;

/// A boxed future for object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends a built request and reports the response status.
pub trait Transport: Send + Sync {
    /// Returns a short name for logs.
    fn name(&self) -> &str;

    /// Dispatches `request` and returns the HTTP status of the response.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` when no response status could be obtained:
    /// malformed URL, refused connection, DNS or TLS failure, timeout.
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, SyncResult<StatusCode>>;
}

/// Timeouts and identification for [`ReqwestTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Time allowed to establish the connection.
    pub connect_timeout: Duration,
    /// Time allowed for each read from the connection.
    pub read_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl TransportConfig {
    /// Default connect timeout in seconds.
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;

    /// Default read timeout in seconds.
    pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 15;

    /// Sets both timeouts.
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(Self::DEFAULT_CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(Self::DEFAULT_READ_TIMEOUT_SECS),
            user_agent: format!("timetable/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given configuration.
    pub fn new(config: &TransportConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| SyncError::internal("failed to create HTTP client").with_source(e))?;

        Ok(Self { client })
    }

    /// Creates a transport with the default 15 second timeouts.
    pub fn with_defaults() -> SyncResult<Self> {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, SyncResult<StatusCode>> {
        Box::pin(async move {
            trace!(method = %request.method(), url = %request.url(), "Sending request");

            let response = self
                .client
                .request(request.method().clone(), request.url())
                .header(AUTHORIZATION, request.authorization())
                .send()
                .await?;

            let status = response.status();
            debug!(status = %status, "Received response");
            Ok(status)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Accepts one connection, captures the request head and answers with
    /// `status_line`.
    async fn serve_once(status_line: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                status_line
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{}", addr), handle)
    }

    #[test]
    fn default_config_uses_fifteen_second_timeouts() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.read_timeout, Duration::from_secs(15));
        assert!(config.user_agent.starts_with("timetable/"));
    }

    #[test]
    fn config_builder_methods() {
        let config = TransportConfig::default()
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(2))
            .with_user_agent("test-agent");
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "test-agent");
    }

    #[tokio::test]
    async fn sends_path_and_authorization() {
        let (base, server) = serve_once("404 Not Found").await;
        let transport = ReqwestTransport::with_defaults().unwrap();

        let url = format!("{}/home/alice/Work?fmt=ics&start=2023/01/01", base);
        let status = transport
            .execute(HttpRequest::get(url, "Basic YWxpY2U6czNjcmV0"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /home/alice/Work?fmt=ics&start=2023/01/01 HTTP/1.1\r\n"));
        assert!(
            head.to_ascii_lowercase()
                .contains("authorization: basic ywxpy2u6cznjcmv0")
        );
        assert!(head.to_ascii_lowercase().contains("user-agent: timetable/"));
    }

    #[tokio::test]
    async fn reports_server_error_status() {
        let (base, server) = serve_once("500 Internal Server Error").await;
        let transport = ReqwestTransport::with_defaults().unwrap();

        let status = transport
            .execute(HttpRequest::get(format!("{}/home/a/b?", base), "Basic eDp5"))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_url_is_an_error() {
        let transport = ReqwestTransport::with_defaults().unwrap();
        let result = transport
            .execute(HttpRequest::get("not a url/home/a/b?", "Basic eDp5"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn silent_server_hits_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(2)).await;
            drop(stream);
        });

        let config = TransportConfig::default()
            .with_timeouts(Duration::from_millis(500), Duration::from_millis(100));
        let transport = ReqwestTransport::new(&config).unwrap();

        let result = transport
            .execute(HttpRequest::get(format!("http://{}/home/a/b?", addr), "Basic eDp5"))
            .await;
        assert!(result.is_err());
        server.abort();
    }
}
