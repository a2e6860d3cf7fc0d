use crate::transaction_repo::TransactionRepo;
use crate::user_repo::UserRepo;
use crate::HealthCheck;
use async_trait::async_trait;
use std::sync::Arc;

mod transaction_repo;
mod user_repo;

pub use transaction_repo::MemTransactionRepo;
pub use user_repo::MemUserRepo;

pub struct MemHealthCheck;

#[async_trait]
impl HealthCheck for MemHealthCheck {
    async fn check(&self) -> bool {
        true
    }
}

pub fn create_repos() -> (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn HealthCheck>,
) {
    let user_repo = MemUserRepo::new();
    let transaction_repo = MemTransactionRepo::new();

    (
        Arc::new(user_repo),
        Arc::new(transaction_repo),
        Arc::new(MemHealthCheck),
    )
}
