//! Shared-secret request authentication.

/// Validates the `x-api-key` credential against the configured secret.
///
/// The secret is injected at construction and immutable for the process
/// lifetime; there is no ambient global. Comparison is exact-match, which is
/// the trust level this server operates at.
#[derive(Debug, Clone)]
pub struct ApiKeyGate {
    secret: String,
}

/// Errors from credential validation.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or missing API key")]
    InvalidKey,
}

impl ApiKeyGate {
    /// Creates a gate holding the shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Checks a presented credential.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidKey` - credential absent or not an exact match
    pub fn authorize(&self, presented: Option<&str>) -> Result<(), AuthError> {
        match presented {
            Some(key) if key == self.secret => Ok(()),
            _ => Err(AuthError::InvalidKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_key_authorized() {
        let gate = ApiKeyGate::new("s3cret");
        assert!(gate.authorize(Some("s3cret")).is_ok());
    }

    #[test]
    fn test_wrong_key_rejected() {
        let gate = ApiKeyGate::new("s3cret");
        assert!(gate.authorize(Some("guess")).is_err());
        assert!(gate.authorize(Some("")).is_err());
        assert!(gate.authorize(Some("s3cret ")).is_err());
    }

    #[test]
    fn test_missing_key_rejected() {
        let gate = ApiKeyGate::new("s3cret");
        assert!(gate.authorize(None).is_err());
    }
}
