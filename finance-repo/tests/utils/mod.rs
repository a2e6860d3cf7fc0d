pub mod test_user;

use finance_repo::transaction_repo::TransactionRepo;
use finance_repo::user_repo::UserRepo;
use finance_repo::HealthCheck;
use serde::Deserialize;
use std::fs;
use std::sync::Arc;

#[derive(Deserialize)]
struct TestConfig {
    database_url: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

pub type Repos = (
    Arc<dyn UserRepo>,
    Arc<dyn TransactionRepo>,
    Arc<dyn HealthCheck>,
);

/// Pool large enough for every concurrent writer to hold its own connection
const TEST_POOL_SIZE: u32 = 16;

/// Builds the repos under test. PostgreSQL repos need a `config_test.toml` with a
/// `database_url`; those cases are ignored by default and run with `--include-ignored`.
pub async fn build_repos(repo_type: RepoType) -> Repos {
    match repo_type {
        RepoType::Mem => finance_repo::mem_repo::create_repos(),
        RepoType::SQLx => {
            let config = fs::read_to_string("config_test.toml")
                .expect("PostgreSQL tests need config_test.toml with a database_url");
            let config: TestConfig = toml::from_str(config.as_str()).unwrap();
            finance_repo::sqlx_repo::create_repos(&config.database_url, TEST_POOL_SIZE)
                .await
                .unwrap()
        }
    }
}
