//! Checkout payment signature verification.
//!
//! After checkout the gateway hands the client a signature over
//! `order_id|payment_id`, keyed with the merchant's key secret. Only a
//! payment whose signature verifies may be applied to a subscription.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::payment::Payment;

/// Length of a hex-encoded HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

/// Verifies `signature` against `HMAC-SHA256(secret, order_id + "|" + payment_id)`.
///
/// The signature is expected as lowercase or uppercase hex. Anything that
/// does not decode to a 32-byte digest is a mismatch, never an error.
pub fn verify(order_id: &str, payment_id: &str, signature: &str, secret: &str) -> bool {
    if signature.len() != SIGNATURE_HEX_LEN {
        return false;
    }
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let expected = digest(order_id, payment_id, secret.as_bytes());
    constant_time_compare(&expected, &provided)
}

/// Hex signature the gateway would produce for this order and payment.
pub fn sign(order_id: &str, payment_id: &str, secret: &str) -> String {
    hex::encode(digest(order_id, payment_id, secret.as_bytes()))
}

fn digest(order_id: &str, payment_id: &str, secret: &[u8]) -> Vec<u8> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).expect("HMAC accepts any key");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Holds the key secret so it is not passed around as a plain string.
pub struct PaymentSignatureVerifier {
    secret: SecretString,
}

impl PaymentSignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
        }
    }

    pub fn verify(&self, payment: &Payment) -> bool {
        verify(
            payment.order_id.as_str(),
            payment.id.as_str(),
            &payment.signature,
            self.secret.expose_secret(),
        )
    }
}
