use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn create_user(&self, email: &str, name: &str, role: &str) -> Result<AuthUser, AuthError>;
    async fn set_role(&self, user_id: Uuid, role: &str) -> Result<AuthUser, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
    async fn upsert_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Credentials, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<Uuid, AuthUser>>,
        credentials: Mutex<HashMap<Uuid, Credentials>>,
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(users.values().find(|u| u.email == email).cloned())
        }

        async fn create_user(
            &self,
            email: &str,
            name: &str,
            role: &str,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            if users.values().any(|u| u.email == email) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: email.to_string(),
                name: name.to_string(),
                role: role.to_string(),
            };
            users.insert(user.id, user.clone());
            Ok(user)
        }

        async fn set_role(&self, user_id: Uuid, role: &str) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            let user = users.get_mut(&user_id).ok_or(AuthError::NotFound)?;
            user.role = role.to_string();
            Ok(user.clone())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds =
                self.credentials.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            Ok(creds.get(&user_id).cloned())
        }

        async fn upsert_password(
            &self,
            user_id: Uuid,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<Credentials, AuthError> {
            let mut creds =
                self.credentials.lock().map_err(|e| AuthError::Repository(e.to_string()))?;
            let cred = Credentials { user_id, password_hash, password_algorithm };
            creds.insert(user_id, cred.clone());
            Ok(cred)
        }
    }
}
