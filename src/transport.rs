//! HTTP transport used by the client.
//!
//! A failed request may still carry the service's response (e.g. a 422 with
//! an `errors` body). [`TransportOutcome`] keeps that response so the client
//! can parse it the same way as a success.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// HTTP method used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Request to send to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

/// Response received from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Result of sending a request.
#[derive(Debug, Clone)]
pub enum TransportOutcome {
    /// The request completed with a success status.
    Response(HttpResponse),
    /// The request failed. `response` is set when the service still answered.
    Failed {
        error: String,
        response: Option<HttpResponse>,
    },
}

impl TransportOutcome {
    /// The response to parse, if one was obtained.
    pub fn into_response(self) -> Result<HttpResponse, String> {
        match self {
            TransportOutcome::Response(response) => Ok(response),
            TransportOutcome::Failed {
                response: Some(response),
                ..
            } => Ok(response),
            TransportOutcome::Failed {
                error,
                response: None,
            } => Err(error),
        }
    }
}

/// Sends API requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> TransportOutcome;
}

/// [`HttpTransport`] backed by reqwest.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> TransportOutcome {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                return TransportOutcome::Failed {
                    error: e.to_string(),
                    response: None,
                }
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return TransportOutcome::Failed {
                    error: format!("failed to read response body: {e}"),
                    response: None,
                }
            }
        };

        debug!(url = %request.url, status = status.as_u16(), "AbuseIPDB response received");

        let response = HttpResponse {
            status: status.as_u16(),
            body,
        };

        if status.is_success() {
            TransportOutcome::Response(response)
        } else {
            TransportOutcome::Failed {
                error: format!("HTTP {status}"),
                response: Some(response),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_success_yields_response() {
        let outcome = TransportOutcome::Response(response(200, "{}"));
        assert_eq!(outcome.into_response().unwrap(), response(200, "{}"));
    }

    #[test]
    fn test_failure_with_response_yields_response() {
        let outcome = TransportOutcome::Failed {
            error: "HTTP 422".to_string(),
            response: Some(response(422, r#"{"errors":[]}"#)),
        };
        assert_eq!(outcome.into_response().unwrap().status, 422);
    }

    #[test]
    fn test_failure_without_response_yields_error() {
        let outcome = TransportOutcome::Failed {
            error: "connection refused".to_string(),
            response: None,
        };
        assert_eq!(outcome.into_response().unwrap_err(), "connection refused");
    }

    #[test]
    fn test_reqwest_transport_is_send_sync() {
        fn _assert<T: Send + Sync + HttpTransport>() {}
        _assert::<ReqwestTransport>();
    }

    /// Serve one canned response on a local port, returning the port and a
    /// handle yielding the raw request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (u16, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8(head).unwrap()
        });

        (port, handle)
    }

    #[tokio::test]
    async fn test_error_status_keeps_response() {
        let body = r#"{"errors":[{"detail":"Invalid IP"}]}"#;
        let (port, server) = serve_once("422 Unprocessable Entity", body).await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let outcome = transport
            .send(ApiRequest {
                method: Method::Post,
                url: format!("http://127.0.0.1:{port}/report"),
                query: vec![
                    ("ip".to_string(), "1.2.3.4".to_string()),
                    ("categories".to_string(), "18,20".to_string()),
                    ("comment".to_string(), "ssh brute force".to_string()),
                ],
                headers: vec![
                    ("Accept".to_string(), "application/json".to_string()),
                    ("Key".to_string(), "test-key".to_string()),
                ],
            })
            .await;

        match outcome {
            TransportOutcome::Failed {
                response: Some(response),
                ..
            } => assert_eq!(response, self::response(422, body)),
            other => panic!("expected failure with response, got {other:?}"),
        }

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert_eq!(
            request_line,
            "POST /report?ip=1.2.3.4&categories=18%2C20&comment=ssh+brute+force HTTP/1.1"
        );
        let head = head.to_ascii_lowercase();
        assert!(head.contains("\r\naccept: application/json\r\n"));
        assert!(head.contains("\r\nkey: test-key\r\n"));
    }

    #[tokio::test]
    async fn test_success_status_is_response() {
        let body = r#"{"data":{"ipAddress":"1.2.3.4","abuseConfidenceScore":0}}"#;
        let (port, server) = serve_once("200 OK", body).await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let outcome = transport
            .send(ApiRequest {
                method: Method::Get,
                url: format!("http://127.0.0.1:{port}/check"),
                query: vec![
                    ("ipAddress".to_string(), "1.2.3.4".to_string()),
                    ("maxAgeInDays".to_string(), "30".to_string()),
                ],
                headers: vec![],
            })
            .await;

        match outcome {
            TransportOutcome::Response(response) => {
                assert_eq!(response, self::response(200, body))
            }
            other => panic!("expected response, got {other:?}"),
        }

        let head = server.await.unwrap();
        assert!(head.starts_with("GET /check?ipAddress=1.2.3.4&maxAgeInDays=30 HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn test_unreachable_host_has_no_response() {
        let transport = ReqwestTransport::new(Duration::from_millis(500)).unwrap();
        let outcome = transport
            .send(ApiRequest {
                method: Method::Get,
                url: "http://127.0.0.1:1/check".to_string(),
                query: vec![],
                headers: vec![],
            })
            .await;
        assert!(matches!(
            outcome,
            TransportOutcome::Failed { response: None, .. }
        ));
    }
}
