//! Generic persistence traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::UserId;

/// Key-value repository over shared entities.
///
/// Entities are handed out as `Arc`s so that in-process state attached to
/// an entity (such as counters behind a lock) is shared by every holder.
/// Updates replace the stored `Arc` wholesale.
#[async_trait]
pub trait Repository<Entity, Key: ?Sized>: Send + Sync + 'static
where
    Entity: Send + Sync + 'static,
    Key: Send + Sync,
{
    /// Load an entity by key.
    async fn load(&self, key: &Key) -> AppResult<Option<Arc<Entity>>>;

    /// Insert or replace an entity.
    async fn save(&self, entity: Arc<Entity>) -> AppResult<()>;

    /// Delete an entity. Returns `true` if it existed.
    async fn delete(&self, key: &Key) -> AppResult<bool>;

    /// Every stored entity, in insertion order.
    async fn list_all(&self) -> AppResult<Vec<Arc<Entity>>>;
}

/// Repository whose entities belong to a user.
#[async_trait]
pub trait OwnedRepository<Entity, Key: ?Sized>: Repository<Entity, Key>
where
    Entity: Send + Sync + 'static,
    Key: Send + Sync,
{
    /// Entities owned by `user_id`, in insertion order.
    async fn list_by_user(&self, user_id: &UserId) -> AppResult<Vec<Arc<Entity>>>;
}
