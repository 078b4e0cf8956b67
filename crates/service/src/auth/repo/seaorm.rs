use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use models::{user, user_credentials};

/// SeaORM-backed implementation of the auth repository.
pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(m: user::Model) -> AuthUser {
    AuthUser { id: m.id, email: m.email, name: m.name, role: m.role }
}

#[async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let found = user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(to_auth_user))
    }

    async fn create_user(&self, email: &str, name: &str, role: &str) -> Result<AuthUser, AuthError> {
        let created = user::create(&self.db, email, name, role)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(created))
    }

    async fn set_role(&self, user_id: Uuid, role: &str) -> Result<AuthUser, AuthError> {
        let updated = user::set_role(&self.db, user_id, role)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_auth_user(updated))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let found = user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(|c| Credentials {
            user_id: c.user_id,
            password_hash: c.password_hash,
            password_algorithm: c.password_algorithm,
        }))
    }

    async fn upsert_password(
        &self,
        user_id: Uuid,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<Credentials, AuthError> {
        let stored =
            user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
                .await
                .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials {
            user_id: stored.user_id,
            password_hash: stored.password_hash,
            password_algorithm: stored.password_algorithm,
        })
    }
}
