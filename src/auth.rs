use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::constants::ADMIN_SECRET_HEADER;
use crate::error::CatalogError;
use crate::metrics::CatalogMetrics;
use crate::state::AppState;

/// Shared admin secret. This is a gate for moderation endpoints, not a credential system:
/// there are no users, sessions, or rotation.
#[derive(Clone)]
pub struct AdminSecret {
    digest: [u8; 32],
}

impl AdminSecret {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: Sha256::digest(secret.as_bytes()).into(),
        }
    }

    /// Compare a candidate against the secret in time independent of where they differ.
    /// Hashing first fixes the compared length.
    pub fn verify(&self, candidate: Option<&str>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        let candidate: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
        self.digest
            .iter()
            .zip(candidate.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminSecret(..)")
    }
}

/// Extractor that only succeeds when `X-Admin-Secret` matches. It runs before any
/// body extractor, so a rejected request never reaches the service.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = CatalogError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|v| v.to_str().ok());

        if state.admin_secret.verify(provided) {
            Ok(AdminGuard)
        } else {
            CatalogMetrics::record_admin_rejected();
            warn!(
                "Rejected admin request to {} {}",
                parts.method,
                parts.uri.path()
            );
            Err(CatalogError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let secret = AdminSecret::new("admin1234");
        assert!(secret.verify(Some("admin1234")));
        assert!(!secret.verify(Some("admin12345")));
        assert!(!secret.verify(Some("")));
        assert!(!secret.verify(None));
    }

    #[test]
    fn test_debug_hides_secret() {
        let secret = AdminSecret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "AdminSecret(..)");
    }
}
