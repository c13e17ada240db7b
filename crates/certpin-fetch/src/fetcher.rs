//! Sequential TLS certificate fetcher

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use tracing::{info, warn};

use crate::endpoint::{Endpoint, EndpointError};
use crate::pem;
use crate::verifier::AcceptAnyCert;

/// Per-endpoint connect/handshake timeout applied by [`CertFetcher::new`].
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] EndpointError),

    #[error("invalid server name '{0}'")]
    InvalidServerName(String),

    #[error("connection to {endpoint} failed: {source}")]
    ConnectFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS handshake with {endpoint} failed: {source}")]
    HandshakeFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("closing connection to {endpoint} failed: {source}")]
    CloseFailed {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },

    #[error("connection to {endpoint} timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },
}

/// Collects peer certificate chains from a list of endpoints.
///
/// Endpoints are dialed one at a time, in the order given. The first
/// failure aborts the whole run: callers never observe partial output.
pub struct CertFetcher {
    connector: TlsConnector,
    connect_timeout: Duration,
}

impl CertFetcher {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeout(connect_timeout: Duration) -> Self {
        ensure_crypto_provider();

        let config = rustls::ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(AcceptAnyCert::new())
            .with_no_client_auth();

        Self {
            connector: TlsConnector::from(Arc::new(config)),
            connect_timeout,
        }
    }

    /// Fetch the peer chains of all `endpoints` as one concatenated PEM
    /// text block, in endpoint order.
    ///
    /// An empty endpoint list yields an empty string. Chains are emitted
    /// exactly as the peers present them: leaf first, no re-sorting, no
    /// deduplication across endpoints.
    pub async fn fetch(&self, endpoints: &[String]) -> Result<String, FetchError> {
        let mut out = String::new();

        for raw in endpoints {
            let endpoint = Endpoint::parse(raw)?;
            info!("fetching certificates for {}", endpoint);

            let chain = self.fetch_chain(&endpoint).await?;
            if chain.is_empty() {
                warn!("{} presented no certificates", endpoint);
            }
            for der in &chain {
                pem::encode_certificate(der, &mut out);
            }
        }

        Ok(out)
    }

    /// Dial one endpoint and return the raw DER chain its peer presented.
    pub async fn fetch_chain(&self, endpoint: &Endpoint) -> Result<Vec<Vec<u8>>, FetchError> {
        let server_name = ServerName::try_from(endpoint.host().to_string())
            .map_err(|_| FetchError::InvalidServerName(endpoint.host().to_string()))?;

        let tcp = timeout(self.connect_timeout, TcpStream::connect(endpoint.authority()))
            .await
            .map_err(|_| FetchError::Timeout {
                endpoint: endpoint.to_string(),
                after: self.connect_timeout,
            })?
            .map_err(|source| FetchError::ConnectFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let mut stream = timeout(self.connect_timeout, self.connector.connect(server_name, tcp))
            .await
            .map_err(|_| FetchError::Timeout {
                endpoint: endpoint.to_string(),
                after: self.connect_timeout,
            })?
            .map_err(|source| FetchError::HandshakeFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        // Send close_notify before reading the negotiated chain out of the
        // connection state; a failed close aborts the run.
        stream
            .shutdown()
            .await
            .map_err(|source| FetchError::CloseFailed {
                endpoint: endpoint.to_string(),
                source,
            })?;

        let (_, conn) = stream.get_ref();
        let chain = conn
            .peer_certificates()
            .map(|certs| certs.iter().map(|cert| cert.as_ref().to_vec()).collect())
            .unwrap_or_default();

        Ok(chain)
    }
}

impl Default for CertFetcher {
    fn default() -> Self {
        Self::new()
    }
}

// Initialize rustls crypto provider
static CRYPTO_PROVIDER_INIT: std::sync::Once = std::sync::Once::new();

fn ensure_crypto_provider() {
    CRYPTO_PROVIDER_INIT.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("Rustls crypto provider already installed");
        }
    });
}
