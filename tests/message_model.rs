use warbler::application::ports::store::{Applied, Store};
use warbler::application::unit_of_work::Session;
use warbler::domain::likes::{Like, LikeFilter};
use warbler::domain::messages::{MESSAGE_MAX_LEN, MessageFilter, NewMessage};
use warbler::domain::users::{NewUser, User};
use warbler::infrastructure::memory::MemoryStore;

async fn seeded() -> (MemoryStore, User, User) {
    let store = MemoryStore::new();
    let mut users = store
        .apply(vec![
            NewUser::new("testuser1", "testing@testing.com", "digest1", None).into(),
            NewUser::new("testuser2", "testing2@testing.com", "digest2", None).into(),
        ])
        .await
        .unwrap()
        .into_iter()
        .filter_map(Applied::into_user);
    let u1 = users.next().unwrap();
    let u2 = users.next().unwrap();
    store
        .apply(vec![
            NewMessage::new(u1.id, "test message 1").into(),
            NewMessage::new(u2.id, "test message 2").into(),
        ])
        .await
        .unwrap();
    (store, u1, u2)
}

#[tokio::test]
async fn message_is_found_by_text() {
    let (store, u1, _) = seeded().await;
    let mut session = Session::new(&store);
    session.add(NewMessage::new(u1.id, "message message"));
    session.commit().await.unwrap();

    let found = store
        .messages()
        .first(&MessageFilter {
            text: Some("message message".into()),
            ..Default::default()
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, u1.id);
}

#[tokio::test]
async fn message_belongs_to_its_author() {
    let (store, _, u2) = seeded().await;
    let mut session = Session::new(&store);
    session.add(NewMessage::new(u2.id, "test123"));
    session.commit().await.unwrap();

    let by_u2 = store
        .messages()
        .find(&MessageFilter::by_user(u2.id))
        .await
        .unwrap();
    assert_eq!(by_u2.len(), 2);
    assert!(by_u2.iter().all(|m| m.user_id == u2.id));
    // newest first
    assert_eq!(by_u2[0].text, "test123");
}

#[tokio::test]
async fn message_for_unknown_user_is_an_integrity_error() {
    let (store, _, _) = seeded().await;
    let mut session = Session::new(&store);
    session.add(NewMessage::new(999_999, "test456"));
    let err = session.commit().await.unwrap_err();
    assert!(err.is_integrity());
}

#[tokio::test]
async fn overlong_text_is_a_data_error_at_commit() {
    let (store, u1, _) = seeded().await;
    let mut session = Session::new(&store);
    session.add(NewMessage::new(u1.id, "a".repeat(MESSAGE_MAX_LEN + 5)));
    // queued, not yet rejected
    assert_eq!(session.pending().len(), 1);
    let err = session.commit().await.unwrap_err();
    assert!(err.is_data());
    assert_eq!(
        store
            .messages()
            .count(&MessageFilter::by_user(u1.id))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn trailing_spaces_past_the_limit_are_rejected() {
    let (store, u1, _) = seeded().await;
    let mut session = Session::new(&store);
    session.add(NewMessage::new(
        u1.id,
        format!("{}     ", "a".repeat(MESSAGE_MAX_LEN)),
    ));
    let err = session.commit().await.unwrap_err();
    assert!(err.is_data(), "{err}");
}

#[tokio::test]
async fn text_at_the_limit_is_accepted() {
    let (store, u1, _) = seeded().await;
    let mut session = Session::new(&store);
    // multi-byte characters count once each
    session.add(NewMessage::new(u1.id, "é".repeat(MESSAGE_MAX_LEN)));
    let applied = session.commit().await.unwrap();
    let message = applied.into_iter().find_map(Applied::into_message).unwrap();
    assert_eq!(message.text.chars().count(), MESSAGE_MAX_LEN);
}

#[tokio::test]
async fn liked_messages_follow_the_like_rows() {
    let (store, u1, u2) = seeded().await;
    let theirs = store
        .messages()
        .first(&MessageFilter::by_user(u2.id))
        .await
        .unwrap()
        .unwrap();
    let mut session = Session::new(&store);
    session.add(Like {
        user_id: u1.id,
        message_id: theirs.id,
    });
    session.commit().await.unwrap();

    let liked = store
        .messages()
        .find(&MessageFilter {
            liked_by: Some(u1.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(liked, vec![theirs.clone()]);

    // deleting the message takes its likes with it
    store
        .messages()
        .delete_where(&MessageFilter::by_user(u2.id))
        .await
        .unwrap();
    assert_eq!(store.likes().count(&LikeFilter::default()).await.unwrap(), 0);
}
