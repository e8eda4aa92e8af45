use crate::application::ports::store::Store;
use crate::domain::users::{User, UserFilter, non_empty};

pub struct ListUsers<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> ListUsers<'a, S> {
    pub async fn execute(&self, query: Option<String>) -> anyhow::Result<Vec<User>> {
        let filter = UserFilter {
            username_contains: non_empty(query),
            ..Default::default()
        };
        Ok(self.store.users().find(&filter).await?)
    }
}
