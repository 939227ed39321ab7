//! User repository seeded from configuration.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use filegate_core::config::auth::AuthConfig;
use filegate_core::result::AppResult;
use filegate_core::traits::Repository;
use filegate_core::types::UserId;
use filegate_entity::user::User;

/// Users keyed by username.
#[derive(Debug, Default)]
pub struct UserRepository {
    users: DashMap<String, Arc<User>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the repository from the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Self {
        let repo = Self::new();
        for user in &config.users {
            repo.users
                .insert(user.username.clone(), Arc::new(User::from(user)));
        }
        tracing::info!(users = repo.users.len(), "Loaded users");
        repo
    }

    /// Find a user by username.
    pub fn find_by_username(&self, username: &str) -> Option<Arc<User>> {
        self.users.get(username).map(|u| Arc::clone(u.value()))
    }

    /// Find a user by id.
    pub fn find_by_id(&self, id: &UserId) -> Option<Arc<User>> {
        self.users
            .iter()
            .find(|u| u.id == *id)
            .map(|u| Arc::clone(u.value()))
    }
}

#[async_trait]
impl Repository<User, str> for UserRepository {
    async fn load(&self, username: &str) -> AppResult<Option<Arc<User>>> {
        Ok(self.find_by_username(username))
    }

    async fn save(&self, user: Arc<User>) -> AppResult<()> {
        self.users.insert(user.username.clone(), user);
        Ok(())
    }

    async fn delete(&self, username: &str) -> AppResult<bool> {
        Ok(self.users.remove(username).is_some())
    }

    async fn list_all(&self) -> AppResult<Vec<Arc<User>>> {
        let mut users: Vec<Arc<User>> = self.users.iter().map(|u| Arc::clone(u.value())).collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use filegate_core::config::auth::{PermissionsConfig, UserConfig};

    use super::*;

    #[tokio::test]
    async fn test_from_config_and_lookup() {
        let config = AuthConfig {
            users: vec![UserConfig {
                username: "alice".into(),
                permissions: PermissionsConfig {
                    download: true,
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        };
        let repo = UserRepository::from_config(&config);

        let alice = repo.find_by_username("alice").unwrap();
        assert!(alice.permissions.download);
        assert_eq!(repo.find_by_id(&UserId::from_username("alice")).unwrap().username, "alice");
        assert!(repo.load("bob").await.unwrap().is_none());
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }
}
