use crate::user_repo::UserRepoError::{UserAlreadyExists, UserNotFound};
use crate::user_repo::{User, UserRepo, UserRepoError};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemUserRepo {
    users: RwLock<HashMap<String, User>>,
}

impl MemUserRepo {
    pub fn new() -> MemUserRepo {
        MemUserRepo::default()
    }
}

#[async_trait]
impl UserRepo for MemUserRepo {
    async fn get_user(&self, user_id: &str) -> Result<User, UserRepoError> {
        let users = self
            .users
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))?;

        users
            .get(user_id)
            .cloned()
            .ok_or_else(|| UserNotFound(user_id.to_owned()))
    }

    async fn create_user(&self, user: User) -> Result<(), UserRepoError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?;

        match users.entry(user.id.clone()) {
            Entry::Occupied(e) => Err(UserAlreadyExists(e.key().to_owned())),
            Entry::Vacant(e) => {
                e.insert(user);
                Ok(())
            }
        }
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), UserRepoError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?;

        users
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| UserNotFound(user_id.to_owned()))
    }
}
