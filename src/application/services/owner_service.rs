//! Owner identification via signed session cookies.

use hmac::{Hmac, Mac, digest::InvalidLength};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the signed owner id.
pub const SESSION_COOKIE: &str = "user_session";

/// Issues and verifies owner session values.
///
/// A session value is `<owner_id>.<hex HMAC-SHA256(owner_id)>`, keyed by the
/// server secret. Owners are anonymous: a new one is issued to every client
/// that arrives without a valid cookie.
#[derive(Clone)]
pub struct OwnerService {
    mac: HmacSha256,
}

impl OwnerService {
    /// Creates the service from the signing secret.
    ///
    /// # Errors
    ///
    /// Fails only if the HMAC implementation rejects the key length.
    pub fn new(secret: &str) -> Result<Self, InvalidLength> {
        Ok(Self {
            mac: HmacSha256::new_from_slice(secret.as_bytes())?,
        })
    }

    /// Signs `owner_id` and returns the cookie value.
    pub fn sign(&self, owner_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(owner_id.as_bytes());
        format!("{owner_id}.{}", hex::encode(mac.finalize().into_bytes()))
    }

    /// Creates a fresh owner id and its cookie value.
    pub fn issue(&self) -> (String, String) {
        let owner_id = Uuid::new_v4().to_string();
        let value = self.sign(&owner_id);
        (owner_id, value)
    }

    /// Returns the owner id if the signature matches, comparing in constant time.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (owner_id, signature) = value.rsplit_once('.')?;
        if owner_id.is_empty() {
            return None;
        }

        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac.clone();
        mac.update(owner_id.as_bytes());
        mac.verify_slice(&signature).ok()?;

        Some(owner_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> OwnerService {
        OwnerService::new("test-signing-secret").unwrap()
    }

    #[test]
    fn test_sign_then_verify() {
        let service = service();
        let value = service.sign("owner-1");

        assert_eq!(service.verify(&value), Some("owner-1".to_string()));
    }

    #[test]
    fn test_signature_is_hex_sha256() {
        let value = service().sign("owner-1");
        let (_, signature) = value.rsplit_once('.').unwrap();

        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_issue_creates_distinct_owners() {
        let service = service();
        let (first, first_value) = service.issue();
        let (second, _) = service.issue();

        assert_ne!(first, second);
        assert_eq!(service.verify(&first_value), Some(first));
    }

    #[test]
    fn test_tampered_owner_is_rejected() {
        let service = service();
        let value = service.sign("owner-1");
        let (_, signature) = value.rsplit_once('.').unwrap();

        assert_eq!(service.verify(&format!("owner-2.{signature}")), None);
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let value = OwnerService::new("other-secret").unwrap().sign("owner-1");

        assert_eq!(service().verify(&value), None);
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        let service = service();

        for value in ["", "owner-1", ".abcdef", "owner-1.not-hex", "owner-1."] {
            assert_eq!(service.verify(value), None, "{value:?}");
        }
    }
}
