// storelink/app/src/services/signature.rs

//! WooCommerce webhook signatures: base64(HMAC-SHA256(secret, raw body)).

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_TOPIC: &str = "x-wc-webhook-topic";
pub const HEADER_SIGNATURE: &str = "x-wc-webhook-signature";
pub const HEADER_DELIVERY_ID: &str = "x-wc-webhook-delivery-id";

/// Computes the signature WooCommerce would send for `raw_body`.
pub fn compute_signature(raw_body: &[u8], secret: &str) -> Option<String> {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
  mac.update(raw_body);
  Some(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Checks `claimed` against the HMAC of the exact bytes received.
///
/// Never errors: a missing or empty claim, an empty body or secret, or a claim
/// that is not valid base64 all yield `false`. The comparison is constant-time.
pub fn verify_signature(raw_body: &[u8], claimed: Option<&str>, secret: &str) -> bool {
  let claimed = match claimed.map(str::trim) {
    Some(c) if !c.is_empty() => c,
    _ => return false,
  };
  if raw_body.is_empty() || secret.is_empty() {
    return false;
  }

  let claimed_bytes = match STANDARD.decode(claimed) {
    Ok(bytes) => bytes,
    Err(_) => return false,
  };
  let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
    Ok(mac) => mac,
    Err(_) => return false,
  };
  mac.update(raw_body);
  mac.verify_slice(&claimed_bytes).is_ok()
}
