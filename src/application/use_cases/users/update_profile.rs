use anyhow::Context;

use crate::application::ports::credential_hasher::CredentialHasher;
use crate::application::ports::store::{Applied, Change, Store};
use crate::application::unit_of_work::Session;
use crate::domain::users::{
    DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL, User, UserChanges, non_empty, validate_email,
    validate_username,
};

pub struct UpdateProfile<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> {
    pub store: &'a S,
    pub hasher: &'a H,
}

/// Fields left as `None` are kept. An empty image URL resets it to the default;
/// an empty bio or location clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub current_password: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileUpdate {
    Updated(User),
    WrongPassword,
}

impl<'a, S: Store + ?Sized, H: CredentialHasher + ?Sized> UpdateProfile<'a, S, H> {
    pub async fn execute(
        &self,
        user: &User,
        req: &UpdateProfileRequest,
    ) -> anyhow::Result<ProfileUpdate> {
        if !self
            .hasher
            .verify(&req.current_password, &user.password_hash)
        {
            tracing::info!(user_id = user.id, "profile_update_wrong_password");
            return Ok(ProfileUpdate::WrongPassword);
        }

        let username = non_empty(req.username.clone());
        if let Some(name) = &username {
            validate_username(name)?;
        }
        let email = non_empty(req.email.clone());
        if let Some(email) = &email {
            validate_email(email)?;
        }
        let changes = UserChanges {
            username,
            email,
            image_url: req
                .image_url
                .clone()
                .map(|v| non_empty(Some(v)).unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string())),
            header_image_url: req.header_image_url.clone().map(|v| {
                non_empty(Some(v)).unwrap_or_else(|| DEFAULT_HEADER_IMAGE_URL.to_string())
            }),
            bio: req.bio.clone().map(|v| non_empty(Some(v))),
            location: req.location.clone().map(|v| non_empty(Some(v))),
        };
        if changes.is_empty() {
            return Ok(ProfileUpdate::Updated(user.clone()));
        }

        let mut session = Session::new(self.store);
        session.push(Change::UpdateUser(user.id, changes));
        let updated = session
            .commit()
            .await?
            .into_iter()
            .find_map(Applied::into_user)
            .context("profile update returned no user")?;
        tracing::info!(user_id = updated.id, "profile_updated");
        Ok(ProfileUpdate::Updated(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::store::StoreError;
    use crate::application::use_cases::auth::signup::{Signup, SignupRequest};
    use crate::infrastructure::crypto::Argon2CredentialHasher;
    use crate::infrastructure::memory::MemoryStore;

    async fn signup(store: &MemoryStore, hasher: &Argon2CredentialHasher, name: &str) -> User {
        Signup { store, hasher }
            .execute(&SignupRequest {
                username: name.into(),
                email: format!("{name}@testing.com"),
                password: "password".into(),
                image_url: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn wrong_password_leaves_row_intact() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let user = signup(&store, &hasher, "testuser1").await;
        let uc = UpdateProfile {
            store: &store,
            hasher: &hasher,
        };
        let res = uc
            .execute(
                &user,
                &UpdateProfileRequest {
                    current_password: "INVALID".into(),
                    username: Some("renamed".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(res, ProfileUpdate::WrongPassword);
        let row = store.users().get(user.id).await.unwrap().unwrap();
        assert_eq!(row.username, "testuser1");
    }

    #[tokio::test]
    async fn updates_fields_and_resets_empty_image() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let user = signup(&store, &hasher, "testuser1").await;
        let uc = UpdateProfile {
            store: &store,
            hasher: &hasher,
        };
        let res = uc
            .execute(
                &user,
                &UpdateProfileRequest {
                    current_password: "password".into(),
                    bio: Some("hello there".into()),
                    location: Some("".into()),
                    image_url: Some("".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let ProfileUpdate::Updated(updated) = res else {
            panic!("expected update");
        };
        assert_eq!(updated.bio.as_deref(), Some("hello there"));
        assert_eq!(updated.location, None);
        assert_eq!(updated.image_url, DEFAULT_IMAGE_URL);
        assert_eq!(updated.username, "testuser1");
    }

    #[tokio::test]
    async fn taken_username_is_an_integrity_error() {
        let store = MemoryStore::new();
        let hasher = Argon2CredentialHasher::with_params(64, 1, 1).unwrap();
        let user = signup(&store, &hasher, "testuser1").await;
        signup(&store, &hasher, "testuser2").await;
        let err = UpdateProfile {
            store: &store,
            hasher: &hasher,
        }
        .execute(
            &user,
            &UpdateProfileRequest {
                current_password: "password".into(),
                username: Some("testuser2".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(err.downcast_ref::<StoreError>().unwrap().is_integrity());
    }
}
