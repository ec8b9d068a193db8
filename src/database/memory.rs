use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CascadeSummary, CommentEntity, Datastore, NewUser, PostEntity, StoreError, UserEntity,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserEntity>,
    posts: Vec<PostEntity>,
    comments: Vec<CommentEntity>,
}

/// 进程内存储，用于本地开发（`DATABASE_URL=memory://`）和测试
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every datastore call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn insert_post(&self, user_id: Uuid) -> PostEntity {
        let post = PostEntity {
            id: Uuid::new_v4(),
            user_id,
        };
        self.tables.write().await.posts.push(post.clone());
        post
    }

    pub async fn insert_comment(&self, user_id: Uuid) -> CommentEntity {
        let comment = CommentEntity {
            id: Uuid::new_v4(),
            user_id,
        };
        self.tables.write().await.comments.push(comment.clone());
        comment
    }

    pub async fn posts_by_user(&self, user_id: Uuid) -> Vec<PostEntity> {
        let tables = self.tables.read().await;
        tables
            .posts
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn comments_by_user(&self, user_id: Uuid) -> Vec<CommentEntity> {
        let tables = self.tables.read().await;
        tables
            .comments
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self) -> Result<Vec<UserEntity>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.users.clone())
    }

    async fn create_user(&self, user: NewUser) -> Result<UserEntity, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        let created = UserEntity {
            id: Uuid::new_v4(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn delete_user_cascade(
        &self,
        user_id: Uuid,
    ) -> Result<Option<CascadeSummary>, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let before = tables.users.len();
        tables.users.retain(|u| u.id != user_id);
        if tables.users.len() == before {
            return Ok(None);
        }

        let posts_before = tables.posts.len();
        tables.posts.retain(|p| p.user_id != user_id);
        let comments_before = tables.comments.len();
        tables.comments.retain(|c| c.user_id != user_id);

        Ok(Some(CascadeSummary {
            posts_deleted: (posts_before - tables.posts.len()) as u64,
            comments_deleted: (comments_before - tables.comments.len()) as u64,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            username: "someone".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();

        let err = store.create_user(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(email) if email == "a@x.com"));
        assert_eq!(store.find_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cascade_only_touches_the_deleted_user() {
        let store = MemoryStore::new();
        let alice = store.create_user(new_user("alice@x.com")).await.unwrap();
        let bob = store.create_user(new_user("bob@x.com")).await.unwrap();
        store.insert_post(alice.id).await;
        store.insert_post(alice.id).await;
        store.insert_comment(alice.id).await;
        store.insert_post(bob.id).await;
        store.insert_comment(bob.id).await;

        let summary = store.delete_user_cascade(alice.id).await.unwrap();
        assert_eq!(
            summary,
            Some(CascadeSummary {
                posts_deleted: 2,
                comments_deleted: 1,
            })
        );
        assert!(store.posts_by_user(alice.id).await.is_empty());
        assert!(store.comments_by_user(alice.id).await.is_empty());
        assert_eq!(store.posts_by_user(bob.id).await.len(), 1);
        assert_eq!(store.comments_by_user(bob.id).await.len(), 1);
    }

    #[tokio::test]
    async fn missing_user_leaves_dependents_alone() {
        let store = MemoryStore::new();
        let orphan = Uuid::new_v4();
        store.insert_post(orphan).await;

        assert_eq!(store.delete_user_cascade(orphan).await.unwrap(), None);
        assert_eq!(store.posts_by_user(orphan).await.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_offline(true);

        assert!(matches!(
            store.find_users().await,
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.find_user_by_email("a@x.com").await,
            Err(StoreError::Unavailable)
        ));
    }
}
