use crate::application::ports::store::{Change, Store};
use crate::application::unit_of_work::Session;
use crate::domain::users::UserId;

pub struct DeleteUser<'a, S: Store + ?Sized> {
    pub store: &'a S,
}

impl<'a, S: Store + ?Sized> DeleteUser<'a, S> {
    /// Messages, follows in both directions and likes are removed with the user.
    pub async fn execute(&self, user_id: UserId) -> anyhow::Result<()> {
        let mut session = Session::new(self.store);
        session.push(Change::DeleteUser(user_id));
        let removed: u64 = session.commit().await?.iter().map(|a| a.removed()).sum();
        anyhow::ensure!(removed > 0, "user not found");
        tracing::info!(user_id, "user_deleted");
        Ok(())
    }
}
