//! In-process store with the same constraints as the PostgreSQL schema:
//! unique username/email, foreign keys with cascading deletes, 140 character
//! message text, no self-follow, no duplicate follow or like.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::repository::{Entity, Repository};
use crate::application::ports::store::{Applied, Change, Store, StoreError};
use crate::domain::follows::{Follows, FollowsFilter};
use crate::domain::likes::{Like, LikeFilter};
use crate::domain::messages::{Message, MessageFilter, MessageId, NewMessage};
use crate::domain::users::{NewUser, User, UserChanges, UserFilter, UserId};

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
struct Tables {
    users: BTreeMap<UserId, User>,
    messages: BTreeMap<MessageId, Message>,
    /// (user_being_followed_id, user_following_id)
    follows: BTreeSet<(UserId, UserId)>,
    /// (user_id, message_id)
    likes: BTreeSet<(UserId, MessageId)>,
    next_user_id: UserId,
    next_message_id: MessageId,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            messages: BTreeMap::new(),
            follows: BTreeSet::new(),
            likes: BTreeSet::new(),
            next_user_id: 1,
            next_message_id: 1,
        }
    }
}

impl Tables {
    fn apply(&mut self, change: Change) -> Result<Applied, StoreError> {
        match change {
            Change::InsertUser(new) => self.insert_user(new).map(Applied::User),
            Change::UpdateUser(id, changes) => self.update_user(id, &changes).map(Applied::User),
            Change::DeleteUser(id) => Ok(Applied::Removed(self.delete_user(id))),
            Change::InsertMessage(new) => self.insert_message(new).map(Applied::Message),
            Change::DeleteMessage(id) => Ok(Applied::Removed(self.delete_message(id))),
            Change::InsertFollows(f) => self.insert_follows(f).map(Applied::Follows),
            Change::DeleteFollows(f) => {
                let removed = self
                    .follows
                    .remove(&(f.user_being_followed_id, f.user_following_id));
                Ok(Applied::Removed(u64::from(removed)))
            }
            Change::InsertLike(l) => self.insert_like(l).map(Applied::Like),
            Change::DeleteLike(l) => {
                let removed = self.likes.remove(&(l.user_id, l.message_id));
                Ok(Applied::Removed(u64::from(removed)))
            }
        }
    }

    fn check_unique_user(&self, id: Option<UserId>, username: &str, email: &str) -> Result<(), StoreError> {
        for other in self.users.values().filter(|u| Some(u.id) != id) {
            if other.username == username {
                return Err(StoreError::Integrity(format!(
                    "duplicate key value violates unique constraint \"users_username_key\": ({username})"
                )));
            }
            if other.email == email {
                return Err(StoreError::Integrity(format!(
                    "duplicate key value violates unique constraint \"users_email_key\": ({email})"
                )));
            }
        }
        Ok(())
    }

    fn require_user(&self, id: UserId, constraint: &str) -> Result<(), StoreError> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::Integrity(format!(
                "insert violates foreign key constraint \"{constraint}\": users({id}) not present"
            )))
        }
    }

    fn insert_user(&mut self, new: NewUser) -> Result<User, StoreError> {
        self.check_unique_user(None, &new.username, &new.email)?;
        let id = self.next_user_id;
        self.next_user_id += 1;
        let user = new.into_user(id);
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn update_user(&mut self, id: UserId, changes: &UserChanges) -> Result<User, StoreError> {
        let mut user = self
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::Missing {
                table: User::TABLE,
                key: id.to_string(),
            })?;
        changes.apply_to(&mut user);
        self.check_unique_user(Some(id), &user.username, &user.email)?;
        self.users.insert(id, user.clone());
        Ok(user)
    }

    fn delete_user(&mut self, id: UserId) -> u64 {
        if self.users.remove(&id).is_none() {
            return 0;
        }
        let owned: Vec<MessageId> = self
            .messages
            .values()
            .filter(|m| m.user_id == id)
            .map(|m| m.id)
            .collect();
        for message_id in owned {
            self.delete_message(message_id);
        }
        self.follows
            .retain(|(followed, follower)| *followed != id && *follower != id);
        self.likes.retain(|(user_id, _)| *user_id != id);
        1
    }

    fn insert_message(&mut self, new: NewMessage) -> Result<Message, StoreError> {
        if new.exceeds_max_len() {
            return Err(StoreError::message_too_long());
        }
        self.require_user(new.user_id, "messages_user_id_fkey")?;
        let id = self.next_message_id;
        self.next_message_id += 1;
        let message = Message {
            id,
            text: new.text,
            timestamp: chrono::Utc::now(),
            user_id: new.user_id,
        };
        self.messages.insert(id, message.clone());
        Ok(message)
    }

    fn delete_message(&mut self, id: MessageId) -> u64 {
        if self.messages.remove(&id).is_none() {
            return 0;
        }
        self.likes.retain(|(_, message_id)| *message_id != id);
        1
    }

    fn insert_follows(&mut self, f: Follows) -> Result<Follows, StoreError> {
        self.require_user(f.user_being_followed_id, "follows_user_being_followed_id_fkey")?;
        self.require_user(f.user_following_id, "follows_user_following_id_fkey")?;
        if f.is_self_follow() {
            return Err(StoreError::Integrity(
                "new row violates check constraint \"follows_no_self_follow\"".into(),
            ));
        }
        if !self
            .follows
            .insert((f.user_being_followed_id, f.user_following_id))
        {
            return Err(StoreError::Integrity(
                "duplicate key value violates unique constraint \"follows_pkey\"".into(),
            ));
        }
        Ok(f)
    }

    fn insert_like(&mut self, l: Like) -> Result<Like, StoreError> {
        self.require_user(l.user_id, "likes_user_id_fkey")?;
        if !self.messages.contains_key(&l.message_id) {
            return Err(StoreError::Integrity(format!(
                "insert violates foreign key constraint \"likes_message_id_fkey\": messages({}) not present",
                l.message_id
            )));
        }
        if !self.likes.insert((l.user_id, l.message_id)) {
            return Err(StoreError::Integrity(
                "duplicate key value violates unique constraint \"likes_pkey\"".into(),
            ));
        }
        Ok(l)
    }

    fn user_matches(&self, filter: &UserFilter, u: &User) -> bool {
        filter.username.as_ref().is_none_or(|v| *v == u.username)
            && filter.email.as_ref().is_none_or(|v| *v == u.email)
            && filter
                .username_contains
                .as_ref()
                .is_none_or(|v| u.username.to_lowercase().contains(&v.to_lowercase()))
            && filter
                .followed_by
                .is_none_or(|follower| self.follows.contains(&(u.id, follower)))
            && filter
                .following
                .is_none_or(|followed| self.follows.contains(&(followed, u.id)))
    }

    fn message_matches(&self, filter: &MessageFilter, m: &Message) -> bool {
        filter.user_id.is_none_or(|id| id == m.user_id)
            && filter
                .authored_by
                .as_ref()
                .is_none_or(|ids| ids.contains(&m.user_id))
            && filter.text.as_ref().is_none_or(|t| *t == m.text)
            && filter
                .liked_by
                .is_none_or(|user_id| self.likes.contains(&(user_id, m.id)))
    }

    fn find_messages(&self, filter: &MessageFilter) -> Vec<Message> {
        let mut out: Vec<Message> = self
            .messages
            .values()
            .filter(|m| self.message_matches(filter, m))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        if let Some(limit) = filter.limit {
            out.truncate(limit);
        }
        out
    }
}

#[async_trait]
impl Repository<User> for MemoryStore {
    async fn get(&self, key: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&key).cloned())
    }

    async fn find(&self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .filter(|u| t.user_matches(filter, u))
            .cloned()
            .collect())
    }

    async fn delete_where(&self, filter: &UserFilter) -> Result<u64, StoreError> {
        let mut t = self.tables.write().await;
        let ids: Vec<UserId> = t
            .users
            .values()
            .filter(|u| t.user_matches(filter, u))
            .map(|u| u.id)
            .collect();
        Ok(ids.into_iter().map(|id| t.delete_user(id)).sum())
    }
}

#[async_trait]
impl Repository<Message> for MemoryStore {
    async fn get(&self, key: MessageId) -> Result<Option<Message>, StoreError> {
        Ok(self.tables.read().await.messages.get(&key).cloned())
    }

    async fn find(&self, filter: &MessageFilter) -> Result<Vec<Message>, StoreError> {
        Ok(self.tables.read().await.find_messages(filter))
    }

    async fn delete_where(&self, filter: &MessageFilter) -> Result<u64, StoreError> {
        let mut t = self.tables.write().await;
        let ids: Vec<MessageId> = t.find_messages(filter).into_iter().map(|m| m.id).collect();
        Ok(ids.into_iter().map(|id| t.delete_message(id)).sum())
    }
}

#[async_trait]
impl Repository<Follows> for MemoryStore {
    async fn get(&self, key: (UserId, UserId)) -> Result<Option<Follows>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.follows.get(&key).map(|(followed, follower)| Follows {
            user_being_followed_id: *followed,
            user_following_id: *follower,
        }))
    }

    async fn find(&self, filter: &FollowsFilter) -> Result<Vec<Follows>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.follows
            .iter()
            .map(|(followed, follower)| Follows {
                user_being_followed_id: *followed,
                user_following_id: *follower,
            })
            .filter(|f| filter.matches(f))
            .collect())
    }

    async fn delete_where(&self, filter: &FollowsFilter) -> Result<u64, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.follows.len();
        t.follows.retain(|(followed, follower)| {
            !filter.matches(&Follows {
                user_being_followed_id: *followed,
                user_following_id: *follower,
            })
        });
        Ok((before - t.follows.len()) as u64)
    }
}

#[async_trait]
impl Repository<Like> for MemoryStore {
    async fn get(&self, key: (UserId, MessageId)) -> Result<Option<Like>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.likes.get(&key).map(|(user_id, message_id)| Like {
            user_id: *user_id,
            message_id: *message_id,
        }))
    }

    async fn find(&self, filter: &LikeFilter) -> Result<Vec<Like>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.likes
            .iter()
            .map(|(user_id, message_id)| Like {
                user_id: *user_id,
                message_id: *message_id,
            })
            .filter(|l| filter.matches(l))
            .collect())
    }

    async fn delete_where(&self, filter: &LikeFilter) -> Result<u64, StoreError> {
        let mut t = self.tables.write().await;
        let before = t.likes.len();
        t.likes.retain(|(user_id, message_id)| {
            !filter.matches(&Like {
                user_id: *user_id,
                message_id: *message_id,
            })
        });
        Ok((before - t.likes.len()) as u64)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn users(&self) -> &dyn Repository<User> {
        self
    }

    fn messages(&self) -> &dyn Repository<Message> {
        self
    }

    fn follows(&self) -> &dyn Repository<Follows> {
        self
    }

    fn likes(&self) -> &dyn Repository<Like> {
        self
    }

    async fn apply(&self, changes: Vec<Change>) -> Result<Vec<Applied>, StoreError> {
        let mut guard = self.tables.write().await;
        let mut staged = guard.clone();
        let mut applied = Vec::with_capacity(changes.len());
        for change in changes {
            applied.push(staged.apply(change)?);
        }
        *guard = staged;
        Ok(applied)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed(store: &MemoryStore) -> (User, User) {
        let applied = store
            .apply(vec![
                NewUser::new("testuser1", "testing@testing.com", "h1", None).into(),
                NewUser::new("testuser2", "testing2@testing.com", "h2", None).into(),
            ])
            .await
            .unwrap();
        let mut users = applied.into_iter().filter_map(Applied::into_user);
        (users.next().unwrap(), users.next().unwrap())
    }

    #[tokio::test]
    async fn duplicate_email_is_an_integrity_error() {
        let store = MemoryStore::new();
        seed(&store).await;
        let err = store
            .apply(vec![
                NewUser::new("someone", "testing@testing.com", "h", None).into(),
            ])
            .await
            .unwrap_err();
        assert!(err.is_integrity(), "{err}");
    }

    #[tokio::test]
    async fn update_cannot_steal_a_username() {
        let store = MemoryStore::new();
        let (u1, _) = seed(&store).await;
        let changes = UserChanges {
            username: Some("testuser2".into()),
            ..Default::default()
        };
        let err = store
            .apply(vec![Change::UpdateUser(u1.id, changes)])
            .await
            .unwrap_err();
        assert!(err.is_integrity());
        let unchanged = Repository::<User>::get(&store, u1.id).await.unwrap().unwrap();
        assert_eq!(unchanged.username, "testuser1");
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_missing() {
        let store = MemoryStore::new();
        let err = store
            .apply(vec![Change::UpdateUser(42, UserChanges::default())])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Missing { table: "users", .. }));
    }

    #[tokio::test]
    async fn follow_constraints() {
        let store = MemoryStore::new();
        let (u1, u2) = seed(&store).await;
        store
            .apply(vec![Follows::new(u1.id, u2.id).into()])
            .await
            .unwrap();
        let dup = store.apply(vec![Follows::new(u1.id, u2.id).into()]).await;
        assert!(dup.unwrap_err().is_integrity());
        let own = store.apply(vec![Follows::new(u1.id, u1.id).into()]).await;
        assert!(own.unwrap_err().is_integrity());
        let ghost = store.apply(vec![Follows::new(u1.id, 999).into()]).await;
        assert!(ghost.unwrap_err().is_integrity());
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let store = MemoryStore::new();
        let (u1, u2) = seed(&store).await;
        let applied = store
            .apply(vec![
                NewMessage::new(u1.id, "hello").into(),
                Follows::new(u1.id, u2.id).into(),
                Follows::new(u2.id, u1.id).into(),
            ])
            .await
            .unwrap();
        let message = applied
            .into_iter()
            .find_map(Applied::into_message)
            .unwrap();
        store
            .apply(vec![Like {
                user_id: u2.id,
                message_id: message.id,
            }
            .into()])
            .await
            .unwrap();

        let removed = store.apply(vec![Change::DeleteUser(u1.id)]).await.unwrap();
        assert_eq!(removed[0].removed(), 1);
        assert_eq!(store.messages().count(&MessageFilter::default()).await.unwrap(), 0);
        assert_eq!(store.follows().count(&FollowsFilter::default()).await.unwrap(), 0);
        assert_eq!(store.likes().count(&LikeFilter::default()).await.unwrap(), 0);
        assert!(Repository::<User>::get(&store, u2.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn relation_filters() {
        let store = MemoryStore::new();
        let (u1, u2) = seed(&store).await;
        store
            .apply(vec![Follows::new(u1.id, u2.id).into()])
            .await
            .unwrap();
        let followed = store
            .users()
            .find(&UserFilter {
                followed_by: Some(u1.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(followed, vec![u2.clone()]);
        let followers = store
            .users()
            .find(&UserFilter {
                following: Some(u2.id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(followers, vec![u1]);
        let search = store
            .users()
            .find(&UserFilter {
                username_contains: Some("USER2".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search, vec![u2]);
    }

    #[tokio::test]
    async fn bulk_delete_wipes_tables() {
        let store = MemoryStore::new();
        let (u1, _) = seed(&store).await;
        store
            .apply(vec![NewMessage::new(u1.id, "hello").into()])
            .await
            .unwrap();
        assert_eq!(store.users().delete_where(&UserFilter::default()).await.unwrap(), 2);
        assert_eq!(store.messages().count(&MessageFilter::default()).await.unwrap(), 0);
    }
}
