use chrono::Utc;
use std::sync::Arc;

use crate::storage::DataStore;
use crate::userdb::{
    errors::UserError,
    password::{hash_password, verify_password},
    types::User,
};

use super::postgres::*;
use super::sqlite::*;

/// Account storage over whichever relational backend the data store wraps.
#[derive(Clone)]
pub struct UserStore {
    store: Arc<dyn DataStore>,
}

impl UserStore {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Initialize the user database tables
    pub async fn init(&self) -> Result<(), UserError> {
        match (self.store.as_sqlite(), self.store.as_postgres()) {
            (Some(pool), _) => create_tables_sqlite(pool).await,
            (_, Some(pool)) => create_tables_postgres(pool).await,
            _ => Err(UserError::Storage("Unsupported database type".to_string())),
        }
    }

    /// Register a new account and return its id.
    ///
    /// Fails with [`UserError::DuplicateEmail`] when the email is taken.
    #[tracing::instrument(skip(self, password))]
    pub async fn insert(&self, name: &str, email: &str, password: &str) -> Result<i64, UserError> {
        let hashed = hash_password(password).await?;
        let created = Utc::now();

        let result = if let Some(pool) = self.store.as_sqlite() {
            insert_user_sqlite(pool, name, email, &hashed, created).await
        } else if let Some(pool) = self.store.as_postgres() {
            insert_user_postgres(pool, name, email, &hashed, created).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        };

        match &result {
            Ok(id) => tracing::info!(user_id = id, "User created"),
            Err(UserError::DuplicateEmail) => tracing::info!("Signup with duplicate email"),
            Err(e) => tracing::error!(error = %e, "User insert failed"),
        }

        result
    }

    /// Check an email/password pair and return the matching user id.
    ///
    /// An unknown email and a wrong password are indistinguishable to the caller.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<i64, UserError> {
        let user = self
            .get_by_email(email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if verify_password(password, &user.hashed_password).await? {
            Ok(user.id)
        } else {
            Err(UserError::InvalidCredentials)
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, id: i64) -> Result<bool, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            user_exists_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            user_exists_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<User, UserError> {
        let user = if let Some(pool) = self.store.as_sqlite() {
            get_user_by_id_sqlite(pool, id).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_id_postgres(pool, id).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }?;

        user.ok_or(UserError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        if let Some(pool) = self.store.as_sqlite() {
            get_user_by_email_sqlite(pool, email).await
        } else if let Some(pool) = self.store.as_postgres() {
            get_user_by_email_postgres(pool, email).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }
    }

    /// Replace the password after confirming the current one.
    ///
    /// Fails with [`UserError::InvalidCredentials`] when `current` is wrong.
    #[tracing::instrument(skip(self, current, new))]
    pub async fn password_update(
        &self,
        id: i64,
        current: &str,
        new: &str,
    ) -> Result<(), UserError> {
        let user = self.get(id).await?;

        if !verify_password(current, &user.hashed_password).await? {
            return Err(UserError::InvalidCredentials);
        }

        let hashed = hash_password(new).await?;

        let updated = if let Some(pool) = self.store.as_sqlite() {
            update_password_sqlite(pool, id, &hashed).await
        } else if let Some(pool) = self.store.as_postgres() {
            update_password_postgres(pool, id, &hashed).await
        } else {
            Err(UserError::Storage("Unsupported database type".to_string()))
        }?;

        if updated == 0 {
            return Err(UserError::NotFound);
        }

        tracing::info!(user_id = id, "Password updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::memory_data_store;

    async fn user_store() -> UserStore {
        let store = UserStore::new(memory_data_store().await);
        store.init().await.expect("init user tables");
        store
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        // Given a fresh store
        let store = user_store().await;

        // When a user signs up
        let id = store
            .insert("Alice", "alice@example.com", "pa$$word")
            .await
            .unwrap();

        // Then the row is readable and the password is not stored in clear
        let user = store.get(id).await.unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_ne!(user.hashed_password, "pa$$word");
        assert!(store.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = user_store().await;
        store
            .insert("Alice", "alice@example.com", "pa$$word")
            .await
            .unwrap();

        let result = store
            .insert("Alice Again", "alice@example.com", "other-password")
            .await;

        assert!(matches!(result, Err(UserError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let store = user_store().await;
        let id = store
            .insert("Bob", "bob@example.com", "correct horse")
            .await
            .unwrap();

        assert_eq!(
            store
                .authenticate("bob@example.com", "correct horse")
                .await
                .unwrap(),
            id
        );
        assert!(matches!(
            store.authenticate("bob@example.com", "wrong").await,
            Err(UserError::InvalidCredentials)
        ));
        assert!(matches!(
            store.authenticate("nobody@example.com", "correct horse").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_missing_user() {
        let store = user_store().await;
        assert!(!store.exists(999).await.unwrap());
        assert!(matches!(store.get(999).await, Err(UserError::NotFound)));
    }

    #[tokio::test]
    async fn test_password_update_stores_new_password() {
        // Given an existing account
        let store = user_store().await;
        let id = store
            .insert("Carol", "carol@example.com", "old-password")
            .await
            .unwrap();

        // When the password is changed
        store
            .password_update(id, "old-password", "new-password")
            .await
            .unwrap();

        // Then only the new password authenticates
        assert_eq!(
            store
                .authenticate("carol@example.com", "new-password")
                .await
                .unwrap(),
            id
        );
        assert!(matches!(
            store.authenticate("carol@example.com", "old-password").await,
            Err(UserError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_password_update_requires_current_password() {
        let store = user_store().await;
        let id = store
            .insert("Dave", "dave@example.com", "old-password")
            .await
            .unwrap();

        let result = store.password_update(id, "guess", "new-password").await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
        assert!(
            store
                .authenticate("dave@example.com", "old-password")
                .await
                .is_ok()
        );
    }
}
