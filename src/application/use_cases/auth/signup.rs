use anyhow::Context;

use crate::application::ports::credential_hasher::CredentialHasher;
use crate::application::ports::store::{Applied, Store};
use crate::application::unit_of_work::Session;
use crate::domain::users::{NewUser, User, validate_signup};

pub struct Signup<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> {
    pub store: &'a S,
    pub hasher: &'a H,
}

#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub image_url: Option<String>,
}

impl<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> Signup<'a, S, H> {
    /// Validate the form and hash the password. Nothing is persisted; uniqueness is
    /// only checked when the returned user is committed.
    pub fn prepare(&self, req: &SignupRequest) -> anyhow::Result<NewUser> {
        let username = req.username.trim();
        let email = req.email.trim();
        validate_signup(username, email, &req.password)?;
        let hash = self.hasher.hash(&req.password)?;
        Ok(NewUser::new(username, email, hash, req.image_url.clone()))
    }

    pub async fn execute(&self, req: &SignupRequest) -> anyhow::Result<User> {
        let pending = self.prepare(req)?;
        let mut session = Session::new(self.store);
        session.add(pending);
        let user = session
            .commit()
            .await?
            .into_iter()
            .find_map(Applied::into_user)
            .context("signup commit returned no user")?;
        tracing::info!(user_id = user.id, username = %user.username, "user_signed_up");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::store::StoreError;
    use crate::domain::users::{DEFAULT_IMAGE_URL, UserFilter, ValidationError};
    use crate::infrastructure::crypto::Argon2CredentialHasher;
    use crate::infrastructure::memory::MemoryStore;

    fn request(username: &str, email: &str) -> SignupRequest {
        SignupRequest {
            username: username.into(),
            email: email.into(),
            password: "password".into(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn prepare_does_not_persist() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let uc = Signup {
            store: &store,
            hasher: &hasher,
        };
        let pending = uc
            .prepare(&request("testuser1", "testing@testing.com"))
            .unwrap();
        assert_ne!(pending.password_hash, "password");
        assert_eq!(pending.image_url, DEFAULT_IMAGE_URL);
        let found = store
            .users()
            .first(&UserFilter::by_username("testuser1"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn duplicate_username_fails_at_commit() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let uc = Signup {
            store: &store,
            hasher: &hasher,
        };
        uc.execute(&request("testuser1", "testing@testing.com"))
            .await
            .unwrap();
        let err = uc
            .execute(&request("testuser1", "testing3@test.com"))
            .await
            .unwrap_err();
        let store_err = err.downcast_ref::<StoreError>().unwrap();
        assert!(store_err.is_integrity());
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_hashing() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let uc = Signup {
            store: &store,
            hasher: &hasher,
        };
        let err = uc.prepare(&request("testuser1", "nope")).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::InvalidEmail)
        );
    }
}
