//! GitHub webhook signature (`x-hub-signature-256`) verification.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::TriggerError;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_PREFIX: &str = "sha256=";

/// Returns `sha256=<lowercase hex HMAC-SHA256(secret, raw_body)>`.
pub fn compute_signature(raw_body: &[u8], shared_secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(shared_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(raw_body);
    format!(
        "{SIGNATURE_PREFIX}{}",
        hex::encode(mac.finalize().into_bytes())
    )
}

/// Checks `presented` against the signature of `raw_body`.
///
/// The comparison runs in constant time with respect to the position of the
/// first differing byte. A mismatch is an [`TriggerError::Authentication`]
/// and must stop the invocation.
pub fn verify_signature(
    raw_body: &[u8],
    shared_secret: &str,
    presented: &str,
) -> Result<(), TriggerError> {
    let expected = compute_signature(raw_body, shared_secret);
    if bool::from(expected.as_bytes().ct_eq(presented.as_bytes())) {
        Ok(())
    } else {
        Err(TriggerError::Authentication)
    }
}
