use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::users::repo_types::{NewUser, User, UserPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistence collaborator for user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users, ordered by id.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<User, StoreError>;
    /// Applies a partial update; `None` fields keep their stored value.
    async fn update(&self, patch: UserPatch) -> Result<User, StoreError>;
    /// Persists a new user and assigns its id.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
}

pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password, first_name, last_name, email, role
            FROM users
            ORDER BY user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, password, first_name, last_name, email, role
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, patch: UserPatch) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                username   = COALESCE($2, username),
                password   = COALESCE($3, password),
                first_name = COALESCE($4, first_name),
                last_name  = COALESCE($5, last_name),
                email      = COALESCE($6, email),
                role       = COALESCE($7, role)
            WHERE user_id = $1
            RETURNING user_id, username, password, first_name, last_name, email, role
            "#,
        )
        .bind(patch.user_id)
        .bind(patch.username)
        .bind(patch.password)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.email)
        .bind(patch.role)
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or(StoreError::NotFound(patch.user_id))
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, first_name, last_name, email, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING user_id, username, password, first_name, last_name, email, role
            "#,
        )
        .bind(user.username)
        .bind(user.password)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.email)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}

/// In-memory store used by `AppState::fake()` and the test suite.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().cloned().collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<User, StoreError> {
        let inner = self.inner.lock().unwrap();
        inner.users.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, patch: UserPatch) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner
            .users
            .get_mut(&patch.user_id)
            .ok_or(StoreError::NotFound(patch.user_id))?;
        if let Some(v) = patch.username {
            user.username = v;
        }
        if let Some(v) = patch.password {
            user.password = v;
        }
        if let Some(v) = patch.first_name {
            user.first_name = v;
        }
        if let Some(v) = patch.last_name {
            user.last_name = v;
        }
        if let Some(v) = patch.email {
            user.email = v;
        }
        if let Some(v) = patch.role {
            user.role = v;
        }
        Ok(user.clone())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let created = User {
            user_id: inner.next_id,
            username: user.username,
            password: user.password,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        };
        inner.users.insert(created.user_id, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(username: &str) -> NewUser {
        NewUser {
            username: username.into(),
            password: "pw".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            role: "employee".into(),
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_positive_ids() {
        let store = MemoryUserStore::new();
        let a = store.create(sample("a")).await.expect("create a");
        let b = store.create(sample("b")).await.expect("create b");
        assert!(a.user_id > 0);
        assert!(b.user_id > a.user_id);
        assert_eq!(a.username, "a");
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_id() {
        let store = MemoryUserStore::new();
        for name in ["x", "y", "z"] {
            store.create(sample(name)).await.expect("create");
        }
        let users = store.list_all().await.expect("list");
        let ids: Vec<i64> = users.iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn update_leaves_none_fields_untouched() {
        let store = MemoryUserStore::new();
        let created = store.create(sample("a")).await.expect("create");
        let patch = UserPatch {
            user_id: created.user_id,
            first_name: Some("Jane".into()),
            ..Default::default()
        };
        let updated = store.update(patch).await.expect("update");
        assert_eq!(updated.first_name, "Jane");
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.email, created.email);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = MemoryUserStore::new();
        let err = store.get_by_id(42).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));

        let err = store
            .update(UserPatch {
                user_id: 7,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(7)));
    }
}
