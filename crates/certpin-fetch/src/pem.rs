//! DER to PEM encoding for certificates

use base64::prelude::*;

const PEM_HEADER: &str = "-----BEGIN CERTIFICATE-----\n";
const PEM_FOOTER: &str = "-----END CERTIFICATE-----\n";

// Standard PEM body width (RFC 7468)
const LINE_WIDTH: usize = 64;

/// Append one PEM `CERTIFICATE` record for `der` to `out`.
pub fn encode_certificate(der: &[u8], out: &mut String) {
    out.push_str(PEM_HEADER);
    let body = BASE64_STANDARD.encode(der);
    let mut start = 0;
    while start < body.len() {
        let end = usize::min(start + LINE_WIDTH, body.len());
        out.push_str(&body[start..end]);
        out.push('\n');
        start = end;
    }
    out.push_str(PEM_FOOTER);
}
