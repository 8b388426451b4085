use once_cell::sync::OnceCell;

use super::AuthError;

/// bcrypt hashing, run off the async executor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Compared against when the account does not exist so both paths cost the same
    dummy_hash: std::sync::Arc<OnceCell<String>>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            dummy_hash: Default::default(),
        }
    }

    pub async fn hash(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    /// Returns false on mismatch or when `hash` is not a bcrypt hash.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hash = hash.to_owned();
        let matched = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
            .await
            .map_err(|e| AuthError::Hash(e.to_string()))?;
        Ok(matched)
    }

    /// Burn one verification for an unknown account.
    pub async fn verify_dummy(&self, password: &str) -> Result<(), AuthError> {
        let hash = match self.dummy_hash.get() {
            Some(hash) => hash.clone(),
            None => {
                let hash = self.hash("dummy-password").await?;
                self.dummy_hash.get_or_init(|| hash).clone()
            }
        };
        self.verify(password, &hash).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("password").await.unwrap();
        assert_ne!(hash, "password");
        assert!(hasher.verify("password", &hash).await.unwrap());
        assert!(!hasher.verify("wrongpw", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn invalid_stored_hash_never_matches() {
        let hasher = PasswordHasher::new(4);
        assert!(!hasher.verify("password", "not-a-bcrypt-hash").await.unwrap());
    }

    #[tokio::test]
    async fn dummy_verification_succeeds_without_account() {
        let hasher = PasswordHasher::new(4);
        hasher.verify_dummy("anything").await.unwrap();
        hasher.verify_dummy("again").await.unwrap();
    }
}
