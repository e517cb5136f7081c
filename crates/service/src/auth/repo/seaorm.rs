use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use models::{user, user_credentials};
use crate::auth::domain::{AuthUser, Credentials, NewAuthUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::scope::Role;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_auth_user(u: user::Model) -> Result<AuthUser, AuthError> {
    let role = Role::parse(&u.role).map_err(|e| AuthError::Repository(e.to_string()))?;
    Ok(AuthUser {
        id: u.id,
        email: u.email,
        first_name: u.first_name,
        last_name: u.last_name,
        role,
        is_active: u.is_active,
        is_super_admin: u.is_super_admin,
        agency_id: u.agency_id,
        agency_point_id: u.agency_point_id,
    })
}

/// Advisory lock key held while the first super admin is written.
const BOOTSTRAP_LOCK_KEY: i64 = 0x7472_6176_656c;

fn repo_err(e: sea_orm::DbErr) -> AuthError {
    match models::errors::unique_violation(&e) {
        Some(_) => AuthError::Conflict,
        None => AuthError::Repository(e.to_string()),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        user::find_by_email(&self.db, email).await?.map(to_auth_user).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = user::Entity::find_by_id(id).one(&self.db).await.map_err(repo_err)?;
        res.map(to_auth_user).transpose()
    }

    async fn super_admin_exists(&self) -> Result<bool, AuthError> {
        let n = user::Entity::find()
            .filter(user::Column::Role.eq(Role::SuperAdmin.as_str()))
            .count(&self.db)
            .await
            .map_err(repo_err)?;
        Ok(n > 0)
    }

    async fn create_first_super_admin(
        &self,
        input: NewAuthUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(repo_err)?;
        if txn.get_database_backend() == DbBackend::Postgres {
            // serializes concurrent bootstraps until commit
            txn.execute_unprepared(&format!("SELECT pg_advisory_xact_lock({})", BOOTSTRAP_LOCK_KEY))
                .await
                .map_err(repo_err)?;
        }
        let existing = user::Entity::find()
            .filter(user::Column::Role.eq(Role::SuperAdmin.as_str()))
            .count(&txn)
            .await
            .map_err(repo_err)?;
        if existing > 0 {
            return Err(AuthError::Forbidden("a super administrator already exists".into()));
        }
        if user::find_by_email(&txn, &input.email).await?.is_some() {
            return Err(AuthError::Conflict);
        }
        let created = user::create(&txn, user::NewUser {
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            phone_number: String::new(),
            role: Role::SuperAdmin.to_string(),
            is_super_admin: true,
            agency_id: None,
            agency_point_id: None,
            created_by_id: None,
        })
        .await?;
        user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm).await?;
        txn.commit().await.map_err(repo_err)?;
        to_auth_user(created)
    }

    async fn record_login(&self, user_id: Uuid) -> Result<(), AuthError> {
        user::touch_last_login(&self.db, user_id).await?;
        Ok(())
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}
