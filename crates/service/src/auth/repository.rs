use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, Credentials, NewAuthUser};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn super_admin_exists(&self) -> Result<bool, AuthError>;
    /// Writes the account and its credentials together, or nothing. Fails with
    /// `Forbidden` when a super administrator already exists.
    async fn create_first_super_admin(
        &self,
        input: NewAuthUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError>;
    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use crate::scope::Role;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>, // key: lowercase email
        creds: Mutex<HashMap<Uuid, Credentials>>, // key: user_id
        logins: Mutex<Vec<Uuid>>,
    }

    impl MockAuthRepository {
        pub fn set_active(&self, email: &str, active: bool) {
            if let Some(u) = self.users.lock().unwrap().get_mut(&email.to_lowercase()) {
                u.is_active = active;
            }
        }

        pub fn login_count(&self, user_id: Uuid) -> usize {
            self.logins.lock().unwrap().iter().filter(|id| **id == user_id).count()
        }
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&email.trim().to_lowercase()).cloned())
        }

        async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == id).cloned())
        }

        async fn super_admin_exists(&self) -> Result<bool, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().any(|u| u.role == Role::SuperAdmin))
        }

        async fn create_first_super_admin(
            &self,
            input: NewAuthUser,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            let mut creds = self.creds.lock().unwrap();
            if users.values().any(|u| u.role == Role::SuperAdmin) {
                return Err(AuthError::Forbidden("a super administrator already exists".into()));
            }
            let key = input.email.trim().to_lowercase();
            if users.contains_key(&key) {
                return Err(AuthError::Conflict);
            }
            let user = AuthUser {
                id: Uuid::new_v4(),
                email: key.clone(),
                first_name: input.first_name,
                last_name: input.last_name,
                is_super_admin: input.role == Role::SuperAdmin,
                role: input.role,
                is_active: true,
                agency_id: input.agency_id,
                agency_point_id: input.agency_point_id,
            };
            creds.insert(user.id, Credentials { user_id: user.id, password_hash, password_algorithm });
            users.insert(key, user.clone());
            Ok(user)
        }

        async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError> {
            self.logins.lock().unwrap().push(user_id);
            Ok(())
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
