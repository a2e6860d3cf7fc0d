use finance_repo::transaction_table::TransactionTable;
use finance_repo::user_repo::{User, UserRepo};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: String,
    repo: Arc<dyn UserRepo>,
}

#[allow(dead_code)]
impl TestUser {
    pub async fn new(user_repo: &Arc<dyn UserRepo>) -> TestUser {
        let user_id = new_user_id();
        let user = User::new(user_id.clone(), "not a real hash".to_owned());
        user_repo.create_user(user).await.unwrap();
        info!(%user_id, "Created user");
        TestUser {
            id: user_id,
            repo: user_repo.clone(),
        }
    }

    pub fn table(&self) -> TransactionTable {
        TransactionTable::resolve(&self.id).unwrap()
    }

    pub async fn delete(&self) {
        self.repo.delete_user(&self.id).await.unwrap()
    }
}

/// Unique id that is short enough to name a transaction table
pub fn new_user_id() -> String {
    format!("test-{}", Uuid::new_v4().simple())
}
