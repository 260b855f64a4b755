//! TLS certificate and plain HTTP presence probes

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::rustls::client::{ServerCertVerified, ServerCertVerifier};
use tokio_rustls::rustls::{self, Certificate, ClientConfig, ServerName};
use tokio_rustls::TlsConnector;

use crate::domain::{HttpProbe, TlsProbe};
use crate::error::{Result, ScannerError};

const USER_AGENT: &str = concat!("domain-scanner/", env!("CARGO_PKG_VERSION"));

const HTTPS_PORT: u16 = 443;

/// Accepts whatever chain the server sends. Only its presence is of interest.
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

/// Completes a TLS handshake with `<domain>:443` and reports whether the
/// server presented a certificate. Nothing is sent after the handshake.
pub struct TlsCollector {
    connector: TlsConnector,
    handshake_timeout: Duration,
    port: u16,
}

impl TlsCollector {
    pub fn new(handshake_timeout: Duration) -> Self {
        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            handshake_timeout,
            port: HTTPS_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    async fn handshake(&self, domain: &str) -> Result<bool> {
        let server_name = ServerName::try_from(domain)
            .map_err(|e| ScannerError::validation(format!("'{}' is not a TLS server name: {}", domain, e)))?;

        // one budget for connect plus handshake
        let stream = timeout(self.handshake_timeout, async {
            let tcp = TcpStream::connect((domain, self.port)).await?;
            self.connector.connect(server_name, tcp).await
        })
        .await??;

        let (_, session) = stream.get_ref();
        Ok(session.peer_certificates().map_or(false, |chain| !chain.is_empty()))
    }
}

#[async_trait]
impl TlsProbe for TlsCollector {
    async fn certificate_presented(&self, domain: &str) -> bool {
        match self.handshake(domain).await {
            Ok(presented) => presented,
            Err(e) => {
                tracing::debug!(domain = %domain, error = %e, "TLS probe failed");
                false
            }
        }
    }
}

/// Any HTTP answer on port 80 counts as a live site.
pub struct HttpCollector {
    client: Client,
}

impl HttpCollector {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .timeout(request_timeout)
            .redirect(Policy::none())
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for HttpCollector {
    async fn responds(&self, domain: &str) -> bool {
        match self.client.get(format!("http://{}/", domain)).send().await {
            Ok(response) => {
                tracing::debug!(domain = %domain, status = %response.status(), "HTTP probe answered");
                true
            }
            Err(e) => {
                tracing::debug!(domain = %domain, error = %e, "HTTP probe failed");
                false
            }
        }
    }
}
