//! End-to-end generation tests: fetch from a local endpoint, write a file

use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;

use certpin_cli::{run_generate, GenerateRequest};

fn request(output: std::path::PathBuf) -> GenerateRequest {
    GenerateRequest {
        module: "pinning".to_string(),
        output,
        exported: false,
        connect_timeout: Duration::from_secs(5),
        endpoints: Vec::new(),
    }
}

/// Serve a freshly generated self-signed certificate on 127.0.0.1.
async fn spawn_tls_endpoint() -> std::net::SocketAddr {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let key = rcgen::KeyPair::generate().unwrap();
    let params = rcgen::CertificateParams::new(vec!["localhost".to_string()]).unwrap();
    let cert = params.self_signed(&key).unwrap();

    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(
            vec![cert.der().clone()],
            PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
        )
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                if let Ok(mut tls) = acceptor.accept(stream).await {
                    let mut buf = [0u8; 1024];
                    let _ = tls.read(&mut buf).await;
                }
            });
        }
    });

    addr
}

#[tokio::test]
async fn writes_an_empty_bundle_for_no_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("certs.rs");

    run_generate(&request(output.clone())).await.unwrap();

    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("//! Certificate bundle for `pinning`."));
    assert!(source.contains("pub(crate) static CERTS: &[u8] = b\"\";"));
}

#[tokio::test]
async fn writes_a_bundle_from_a_live_endpoint() {
    let addr = spawn_tls_endpoint().await;
    let endpoint = format!("127.0.0.1:{}", addr.port());

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("certs.rs");

    run_generate(&GenerateRequest {
        exported: true,
        endpoints: vec![endpoint.clone()],
        ..request(output.clone())
    })
    .await
    .unwrap();

    let source = std::fs::read_to_string(&output).unwrap();
    assert!(source.contains("pub static CERTS: &[u8] = b\""));
    assert!(source.contains(&format!("/// CERTS contains certificates for {endpoint}.")));
    assert!(source.contains("-----BEGIN CERTIFICATE-----"));
}

#[tokio::test]
async fn invalid_module_name_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("certs.rs");

    let result = run_generate(&GenerateRequest {
        module: "my-bundle".to_string(),
        ..request(output.clone())
    })
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
}

#[tokio::test]
async fn failing_endpoint_leaves_no_output_file() {
    let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_port = dead.local_addr().unwrap().port();
    drop(dead);

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("certs.rs");

    let result = run_generate(&GenerateRequest {
        endpoints: vec![format!("127.0.0.1:{dead_port}")],
        ..request(output.clone())
    })
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
}
