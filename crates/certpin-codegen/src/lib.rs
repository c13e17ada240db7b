//! Rust source generation for fetched certificate bundles
//!
//! Renders a [`Bundle`] into the text of one Rust source file declaring a
//! `CERTS` static that embeds the accumulated PEM data. Rendering is pure
//! and deterministic: the same bundle always yields byte-identical output.

use thiserror::Error;

/// Render errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("invalid module name '{0}': must be a Rust identifier")]
    InvalidModuleName(String),
}

/// Everything that determines one rendered bundle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Module the generated file is destined for; must be a Rust identifier.
    pub module: String,
    /// `pub` static when set, `pub(crate)` otherwise.
    pub exported: bool,
    /// Concatenated PEM text, as produced by the fetcher.
    pub certificates: String,
    /// Comma-joined original endpoint arguments, echoed in a doc comment.
    pub domains: String,
}

/// Render `bundle` into Rust source text.
///
/// The PEM payload is escaped into a byte-string literal, so the output is
/// valid Rust regardless of the embedded bytes and needs no formatter pass
/// to be usable.
pub fn render(bundle: &Bundle) -> Result<String, RenderError> {
    if !is_valid_module_name(&bundle.module) {
        return Err(RenderError::InvalidModuleName(bundle.module.clone()));
    }

    let visibility = if bundle.exported { "pub" } else { "pub(crate)" };

    let mut out = String::new();
    out.push_str(&format!(
        "//! Certificate bundle for `{}`.\n//!\n//! Generated by certpin. DO NOT EDIT.\n\n",
        bundle.module
    ));
    out.push_str(&format!(
        "/// CERTS contains certificates for {}.\n",
        bundle.domains
    ));
    out.push_str(&format!(
        "{} static CERTS: &[u8] = b\"{}\";\n",
        visibility,
        escape_byte_literal(&bundle.certificates)
    ));

    Ok(out)
}

/// Escape `text` for embedding in a Rust byte-string literal.
///
/// Printable ASCII and newlines pass through (a byte-string literal accepts
/// raw newlines); quotes and backslashes are escaped; everything else is
/// emitted as `\xNN`.
fn escape_byte_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'\\' => escaped.push_str("\\\\"),
            b'"' => escaped.push_str("\\\""),
            b'\n' => escaped.push('\n'),
            0x20..=0x7e => escaped.push(byte as char),
            _ => escaped.push_str(&format!("\\x{byte:02x}")),
        }
    }
    escaped
}

fn is_valid_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
