mod common;

use common::fast_hasher;
use warbler::application::ports::store::{Applied, Change, Store, StoreError};
use warbler::application::unit_of_work::Session;
use warbler::application::use_cases::auth::authenticate::Authenticate;
use warbler::application::use_cases::auth::signup::{Signup, SignupRequest};
use warbler::application::use_cases::users::relationships::{is_followed_by, is_following};
use warbler::domain::follows::{Follows, FollowsFilter};
use warbler::domain::messages::{MessageFilter, NewMessage};
use warbler::domain::users::{DEFAULT_IMAGE_URL, User, UserFilter};
use warbler::infrastructure::memory::MemoryStore;

fn request(username: &str, email: &str, password: &str) -> SignupRequest {
    SignupRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        image_url: None,
    }
}

async fn two_users(store: &MemoryStore) -> (User, User) {
    let hasher = fast_hasher();
    let signup = Signup {
        store,
        hasher: &hasher,
    };
    let u1 = signup
        .execute(&request("testuser1", "testing@testing.com", "password"))
        .await
        .unwrap();
    let u2 = signup
        .execute(&request("testuser2", "testing2@testing.com", "password2"))
        .await
        .unwrap();
    (u1, u2)
}

#[tokio::test]
async fn new_user_has_no_messages_or_followers() {
    let store = MemoryStore::new();
    let (u1, _) = two_users(&store).await;

    let messages = store
        .messages()
        .count(&MessageFilter::by_user(u1.id))
        .await
        .unwrap();
    let followers = store
        .follows()
        .count(&FollowsFilter {
            user_being_followed_id: Some(u1.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(messages, 0);
    assert_eq!(followers, 0);
    assert_eq!(u1.image_url, DEFAULT_IMAGE_URL);
    assert_ne!(u1.password_hash, "password");
}

#[tokio::test]
async fn display_names_the_user() {
    let store = MemoryStore::new();
    let (u1, _) = two_users(&store).await;
    assert_eq!(
        u1.to_string(),
        format!("<User #{}: testuser1, testing@testing.com>", u1.id)
    );
}

#[tokio::test]
async fn following_is_directed() {
    let store = MemoryStore::new();
    let (u1, u2) = two_users(&store).await;
    let mut session = Session::new(&store);
    session.add(Follows::new(u1.id, u2.id));
    session.commit().await.unwrap();

    assert!(is_following(&store, u1.id, u2.id).await.unwrap());
    assert!(!is_following(&store, u2.id, u1.id).await.unwrap());
    assert!(is_followed_by(&store, u2.id, u1.id).await.unwrap());
    assert!(!is_followed_by(&store, u1.id, u2.id).await.unwrap());

    let u2_followers = store
        .users()
        .find(&UserFilter {
            following: Some(u2.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(u2_followers, vec![u1]);
}

#[tokio::test]
async fn signup_with_taken_username_fails_at_commit() {
    let store = MemoryStore::new();
    two_users(&store).await;
    let hasher = fast_hasher();
    let signup = Signup {
        store: &store,
        hasher: &hasher,
    };

    let pending = signup
        .prepare(&request("testuser1", "other@testing.com", "password"))
        .unwrap();
    let mut session = Session::new(&store);
    session.add(pending);
    let err = session.commit().await.unwrap_err();
    assert!(err.is_integrity());
    assert_eq!(store.users().count(&UserFilter::default()).await.unwrap(), 2);
}

#[tokio::test]
async fn signup_with_taken_email_fails_at_commit() {
    let store = MemoryStore::new();
    two_users(&store).await;
    let hasher = fast_hasher();
    let err = Signup {
        store: &store,
        hasher: &hasher,
    }
    .execute(&request("newuser", "testing2@testing.com", "password"))
    .await
    .unwrap_err();
    let store_err = err
        .downcast_ref::<StoreError>()
        .unwrap();
    assert!(store_err.is_integrity());
}

#[tokio::test]
async fn authenticate_accepts_only_the_right_password() {
    let store = MemoryStore::new();
    let (u1, _) = two_users(&store).await;
    let hasher = fast_hasher();
    let auth = Authenticate {
        store: &store,
        hasher: &hasher,
    };

    let found = auth.execute("testuser1", "password").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(u1.id));
    assert!(auth.execute("testuser1", "INVALID").await.unwrap().is_none());
    assert!(auth.execute("INVALID", "password").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_a_user_removes_their_rows() {
    let store = MemoryStore::new();
    let (u1, u2) = two_users(&store).await;
    store
        .apply(vec![
            Follows::new(u1.id, u2.id).into(),
            Follows::new(u2.id, u1.id).into(),
            NewMessage::new(u1.id, "bye").into(),
        ])
        .await
        .unwrap();

    let applied = store
        .apply(vec![Change::DeleteUser(u1.id)])
        .await
        .unwrap();
    assert_eq!(applied.iter().map(Applied::removed).sum::<u64>(), 1);
    assert_eq!(
        store.follows().count(&FollowsFilter::default()).await.unwrap(),
        0
    );
    assert_eq!(
        store.messages().count(&MessageFilter::default()).await.unwrap(),
        0
    );
}
