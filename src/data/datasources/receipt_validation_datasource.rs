use async_trait::async_trait;
use base64::prelude::*;

use crate::{
    constants::{PRODUCTION_VERIFY_RECEIPT_URL, SANDBOX_VERIFY_RECEIPT_URL},
    data::models::verify_receipt::request_model::VerifyReceiptRequestModel,
    domain::entities::receipt::{ReceiptInfo, ReceiptStatus, VerifyReceiptEnvironment},
    errors::IapError,
};

#[async_trait]
pub trait ReceiptValidationDatasource: Send + Sync {
    /// Sends the receipt blob to the verification endpoint for the given
    /// environment and interprets the status-code contract of the response.
    ///
    /// A production callout answered with the sandbox-receipt status retries
    /// against the sandbox endpoint exactly once; sandbox failures are
    /// terminal.
    async fn validate(
        &self,
        environment: VerifyReceiptEnvironment,
        receipt_data: &[u8],
        shared_secret: Option<&str>,
    ) -> Result<ReceiptInfo, IapError>;
}

pub struct ReceiptValidationDatasourceImpl {
    production_url: String,
    sandbox_url: String,
}

impl ReceiptValidationDatasourceImpl {
    pub fn new() -> Self {
        Self {
            production_url: PRODUCTION_VERIFY_RECEIPT_URL.to_string(),
            sandbox_url: SANDBOX_VERIFY_RECEIPT_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoints(production_url: String, sandbox_url: String) -> Self {
        Self {
            production_url,
            sandbox_url,
        }
    }

    fn url_for(&self, environment: VerifyReceiptEnvironment) -> &str {
        match environment {
            VerifyReceiptEnvironment::Production => &self.production_url,
            VerifyReceiptEnvironment::Sandbox => &self.sandbox_url,
        }
    }

    /// Interprets one verification response body. Ordering matters: empty
    /// body, non-object body, then the status-code contract.
    fn interpret(
        environment: VerifyReceiptEnvironment,
        body: String,
    ) -> Result<ValidationOutcome, IapError> {
        if body.is_empty() {
            return Err(IapError::NoData);
        }
        let info: ReceiptInfo = match serde_json::from_str(&body) {
            Ok(info) => info,
            Err(_) => return Err(IapError::JsonDecoding(body)),
        };
        match info.status() {
            ReceiptStatus::Valid => Ok(ValidationOutcome::Approved(info)),
            ReceiptStatus::SandboxReceiptOnProduction
                if environment == VerifyReceiptEnvironment::Production =>
            {
                Ok(ValidationOutcome::RetryAgainstSandbox)
            }
            status => Err(IapError::InvalidReceipt(status)),
        }
    }
}

impl Default for ReceiptValidationDatasourceImpl {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
enum ValidationOutcome {
    Approved(ReceiptInfo),
    RetryAgainstSandbox,
}

#[async_trait]
impl ReceiptValidationDatasource for ReceiptValidationDatasourceImpl {
    async fn validate(
        &self,
        environment: VerifyReceiptEnvironment,
        receipt_data: &[u8],
        shared_secret: Option<&str>,
    ) -> Result<ReceiptInfo, IapError> {
        let request = VerifyReceiptRequestModel {
            receipt_data: BASE64_STANDARD.encode(receipt_data),
            password: shared_secret.map(str::to_owned),
        };
        tracing::debug!(?environment, "sending receipt for verification");
        let response = reqwest::Client::new()
            .post(self.url_for(environment))
            .json(&request)
            .send()
            .await?;
        let body = response.text().await?;
        match Self::interpret(environment, body)? {
            ValidationOutcome::Approved(info) => Ok(info),
            ValidationOutcome::RetryAgainstSandbox => {
                tracing::info!("receipt was issued in the sandbox; retrying against sandbox");
                self.validate(VerifyReceiptEnvironment::Sandbox, receipt_data, shared_secret)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use super::*;

    fn interpret(
        environment: VerifyReceiptEnvironment,
        body: &str,
    ) -> Result<ValidationOutcome, IapError> {
        ReceiptValidationDatasourceImpl::interpret(environment, body.to_string())
    }

    #[test]
    fn empty_body_fails_with_no_data() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Production, ""),
            Err(IapError::NoData)
        ));
    }

    #[test]
    fn non_json_body_preserves_original_text() {
        match interpret(VerifyReceiptEnvironment::Production, "<html>teapot</html>") {
            Err(IapError::JsonDecoding(text)) => assert_eq!(text, "<html>teapot</html>"),
            other => panic!("expected JsonDecoding, got {other:?}"),
        }
    }

    #[test]
    fn json_array_body_is_not_an_object() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Production, "[0, 1]"),
            Err(IapError::JsonDecoding(_))
        ));
    }

    #[test]
    fn object_without_status_is_an_invalid_receipt() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Production, r#"{"receipt": {}}"#),
            Err(IapError::InvalidReceipt(ReceiptStatus::Missing))
        ));
    }

    #[test]
    fn valid_status_approves_with_full_document() {
        let outcome = interpret(
            VerifyReceiptEnvironment::Production,
            r#"{"status": 0, "receipt": {"bundle_id": "com.example.app"}}"#,
        )
        .unwrap();
        match outcome {
            ValidationOutcome::Approved(info) => {
                assert_eq!(info.status(), ReceiptStatus::Valid);
                assert!(info.receipt().is_some());
            }
            ValidationOutcome::RetryAgainstSandbox => panic!("expected approval"),
        }
    }

    #[test]
    fn sandbox_receipt_on_production_requests_the_single_fallback() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Production, r#"{"status": 21007}"#),
            Ok(ValidationOutcome::RetryAgainstSandbox)
        ));
    }

    #[test]
    fn sandbox_receipt_status_from_sandbox_is_terminal() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Sandbox, r#"{"status": 21007}"#),
            Err(IapError::InvalidReceipt(
                ReceiptStatus::SandboxReceiptOnProduction
            ))
        ));
    }

    #[test]
    fn recognized_failure_codes_are_invalid_receipts() {
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Production, r#"{"status": 21004}"#),
            Err(IapError::InvalidReceipt(
                ReceiptStatus::SharedSecretMismatch
            ))
        ));
        assert!(matches!(
            interpret(VerifyReceiptEnvironment::Sandbox, r#"{"status": 21099}"#),
            Err(IapError::InvalidReceipt(ReceiptStatus::Unknown(21099)))
        ));
    }

    /// Minimal verifyReceipt stand-in: accepts connections on a loopback
    /// port and answers every request with the same JSON body, counting
    /// how many requests it served.
    async fn spawn_verify_endpoint(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/verifyReceipt", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(connection) => connection,
                    Err(_) => break,
                };
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
            }
        });
        (url, hits)
    }

    /// Reads one request through the end of its body so the response is
    /// not written mid-upload.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut data = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            data.extend_from_slice(&buf[..n]);
            if let Some(headers_end) = data.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&data[..headers_end]).to_ascii_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= headers_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn production_sandbox_status_triggers_exactly_one_sandbox_call() {
        let (production_url, production_hits) =
            spawn_verify_endpoint(r#"{"status": 21007}"#).await;
        let (sandbox_url, sandbox_hits) =
            spawn_verify_endpoint(r#"{"status": 0, "environment": "Sandbox"}"#).await;
        let datasource =
            ReceiptValidationDatasourceImpl::with_endpoints(production_url, sandbox_url);

        let info = datasource
            .validate(
                VerifyReceiptEnvironment::Production,
                b"receipt-bytes",
                Some("secret"),
            )
            .await
            .unwrap();

        // The final document is the sandbox response, not the production one.
        assert_eq!(
            info.get("environment"),
            Some(&serde_json::json!("Sandbox"))
        );
        assert_eq!(production_hits.load(Ordering::SeqCst), 1);
        assert_eq!(sandbox_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn production_approval_never_touches_the_sandbox() {
        let (production_url, production_hits) =
            spawn_verify_endpoint(r#"{"status": 0, "environment": "Production"}"#).await;
        let (sandbox_url, sandbox_hits) = spawn_verify_endpoint(r#"{"status": 0}"#).await;
        let datasource =
            ReceiptValidationDatasourceImpl::with_endpoints(production_url, sandbox_url);

        let info = datasource
            .validate(VerifyReceiptEnvironment::Production, b"receipt-bytes", None)
            .await
            .unwrap();

        assert_eq!(
            info.get("environment"),
            Some(&serde_json::json!("Production"))
        );
        assert_eq!(production_hits.load(Ordering::SeqCst), 1);
        assert_eq!(sandbox_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn sandbox_rejection_after_fallback_is_terminal() {
        let (production_url, _production_hits) =
            spawn_verify_endpoint(r#"{"status": 21007}"#).await;
        let (sandbox_url, sandbox_hits) = spawn_verify_endpoint(r#"{"status": 21007}"#).await;
        let datasource =
            ReceiptValidationDatasourceImpl::with_endpoints(production_url, sandbox_url);

        let result = datasource
            .validate(VerifyReceiptEnvironment::Production, b"receipt-bytes", None)
            .await;

        assert!(matches!(
            result,
            Err(IapError::InvalidReceipt(
                ReceiptStatus::SandboxReceiptOnProduction
            ))
        ));
        // The fallback never cascades past the sandbox.
        assert_eq!(sandbox_hits.load(Ordering::SeqCst), 1);
    }
}
