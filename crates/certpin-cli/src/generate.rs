//! One bundle-generation run: fetch, render, write

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use certpin_codegen::{render, Bundle};
use certpin_fetch::CertFetcher;

/// Parameters for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Module name for the generated bundle
    pub module: String,
    /// File to write the generated source into
    pub output: PathBuf,
    /// Declare the bundle static `pub` instead of `pub(crate)`
    pub exported: bool,
    /// Per-endpoint connect timeout
    pub connect_timeout: Duration,
    /// Endpoints to fetch certificates from, in order
    pub endpoints: Vec<String>,
}

/// Fetch all endpoints, render the bundle, and write the output file.
///
/// Any failure aborts before the output file is touched.
pub async fn run_generate(request: &GenerateRequest) -> Result<()> {
    let fetcher = CertFetcher::with_timeout(request.connect_timeout);
    let certificates = fetcher
        .fetch(&request.endpoints)
        .await
        .context("failed to fetch certificates")?;

    let bundle = Bundle {
        module: request.module.clone(),
        exported: request.exported,
        certificates,
        domains: request.endpoints.join(", "),
    };
    let source = render(&bundle).context("failed to render certificate bundle")?;

    std::fs::write(&request.output, source)
        .with_context(|| format!("failed to write {}", request.output.display()))?;

    info!(
        "wrote certificate bundle for {} endpoint(s) to {}",
        request.endpoints.len(),
        request.output.display()
    );
    Ok(())
}
