use crate::application::ports::credential_hasher::CredentialHasher;
use crate::application::ports::store::Store;
use crate::domain::users::{User, UserFilter};

pub struct Authenticate<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> {
    pub store: &'a S,
    pub hasher: &'a H,
}

impl<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> Authenticate<'a, S, H> {
    /// Returns the user only when the password verifies. An unknown username and a
    /// wrong password both yield `Ok(None)`. The username is trimmed as at signup.
    pub async fn execute(&self, username: &str, password: &str) -> anyhow::Result<Option<User>> {
        let found = self
            .store
            .users()
            .first(&UserFilter::by_username(username.trim()))
            .await?;
        match found {
            Some(user) if self.hasher.verify(password, &user.password_hash) => Ok(Some(user)),
            _ => {
                tracing::debug!("authentication_failed");
                Ok(None)
            }
        }
    }
}
