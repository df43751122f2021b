use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};

/// Header carrying the admin secret.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Shared-secret check for administrative routes.
pub struct AdminGate {
    secret: Option<String>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("configured", &self.secret.is_some())
            .finish()
    }
}

impl AdminGate {
    /// Create a gate; an empty secret counts as unconfigured
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Whether a secret is configured at all
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Exact, constant-time match of the provided header value
    pub fn authorize(&self, provided: &str) -> bool {
        match &self.secret {
            Some(secret) => secret.as_bytes().ct_eq(provided.as_bytes()).into(),
            None => false,
        }
    }

    /// Check a possibly missing header, mapping the outcome to an error
    pub fn check(&self, provided: Option<&str>) -> Result<()> {
        if !self.is_configured() {
            return Err(AppError::Misconfigured("admin secret is not set".to_string()));
        }
        if self.authorize(provided.unwrap_or_default()) {
            Ok(())
        } else {
            log::warn!("Rejected admin request with bad secret");
            Err(AppError::AdminAuth)
        }
    }
}
