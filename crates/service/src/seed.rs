//! One-time startup seeding of the default super administrator.

use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use configs::AdminSeedConfig;
use models::{user, user_credentials};
use crate::auth::password::{self, PASSWORD_ALGORITHM};
use crate::errors::ServiceError;
use crate::scope::Role;

/// What the seed run did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    Repaired,
    AlreadyPresent,
    Skipped,
}

/// Runs the seed at most once per instance, however many callers race on it.
pub struct DataInitializer {
    db: DatabaseConnection,
    admin: Option<AdminSeedConfig>,
    done: OnceCell<SeedOutcome>,
}

impl DataInitializer {
    pub fn new(db: DatabaseConnection, admin: Option<AdminSeedConfig>) -> Self {
        Self { db, admin, done: OnceCell::new() }
    }

    pub async fn ensure_seeded(&self) -> Result<SeedOutcome, ServiceError> {
        let outcome = self.done.get_or_try_init(|| self.seed()).await?;
        Ok(*outcome)
    }

    async fn seed(&self) -> Result<SeedOutcome, ServiceError> {
        let Some(admin) = &self.admin else {
            warn!(service = "seed", event = "skipped", "no admin seed configured");
            return Ok(SeedOutcome::Skipped);
        };

        if let Some(existing) = user::find_by_email(&self.db, &admin.email).await? {
            let healthy = existing.role == Role::SuperAdmin.as_str() && existing.is_super_admin && existing.is_active;
            if healthy {
                info!(service = "seed", event = "present", user_id = %existing.id, "default super admin present");
                return Ok(SeedOutcome::AlreadyPresent);
            }
            let id = existing.id;
            let mut am: user::ActiveModel = existing.into();
            am.role = Set(Role::SuperAdmin.to_string());
            am.is_super_admin = Set(true);
            am.is_active = Set(true);
            am.agency_id = Set(None);
            am.agency_point_id = Set(None);
            am.updated_at = Set(Utc::now().into());
            am.update(&self.db).await?;
            warn!(service = "seed", event = "repaired", user_id = %id, "default super admin role restored");
            return Ok(SeedOutcome::Repaired);
        }

        let hash = password::hash_password(&admin.password)?;
        let txn = self.db.begin().await?;
        let created = user::create(&txn, user::NewUser {
            email: admin.email.clone(),
            first_name: non_empty_or(&admin.first_name, "Super"),
            last_name: non_empty_or(&admin.last_name, "Admin"),
            phone_number: admin.phone_number.clone(),
            role: Role::SuperAdmin.to_string(),
            is_super_admin: true,
            agency_id: None,
            agency_point_id: None,
            created_by_id: None,
        })
        .await?;
        user_credentials::upsert_password(&txn, created.id, hash, PASSWORD_ALGORITHM).await?;
        txn.commit().await?;
        info!(service = "seed", event = "created", user_id = %created.id, email = %created.email, "default super admin created");
        Ok(SeedOutcome::Created)
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() { fallback.to_string() } else { value.to_string() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
    use crate::test_support::get_db;

    fn admin() -> AdminSeedConfig {
        AdminSeedConfig {
            email: "Root@Travel.test".into(),
            password: "changeme".into(),
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
        }
    }

    #[tokio::test]
    async fn concurrent_callers_seed_once() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let init = Arc::new(DataInitializer::new(db.clone(), Some(admin())));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let init = init.clone();
                tokio::spawn(async move { init.ensure_seeded().await })
            })
            .collect();
        for h in handles {
            assert_eq!(h.await??, SeedOutcome::Created);
        }
        let admins = user::Entity::find()
            .filter(user::Column::Role.eq("SuperAdmin"))
            .count(&db)
            .await?;
        assert_eq!(admins, 1);

        // a fresh initializer finds the account already there
        let again = DataInitializer::new(db.clone(), Some(admin()));
        assert_eq!(again.ensure_seeded().await?, SeedOutcome::AlreadyPresent);
        let seeded = user::find_by_email(&db, "root@travel.test").await?.expect("seeded");
        assert_eq!(seeded.full_name(), "Super Admin");
        assert!(user_credentials::find_by_user(&db, seeded.id).await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn broken_admin_role_is_repaired() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        DataInitializer::new(db.clone(), Some(admin())).ensure_seeded().await?;
        let seeded = user::find_by_email(&db, "root@travel.test").await?.expect("seeded");
        let mut am: user::ActiveModel = seeded.into();
        am.role = Set("AgencyOperator".into());
        am.is_active = Set(false);
        am.update(&db).await?;

        let outcome = DataInitializer::new(db.clone(), Some(admin())).ensure_seeded().await?;
        assert_eq!(outcome, SeedOutcome::Repaired);
        let fixed = user::find_by_email(&db, "root@travel.test").await?.expect("seeded");
        assert_eq!(fixed.role, "SuperAdmin");
        assert!(fixed.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn missing_config_skips() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        assert_eq!(DataInitializer::new(db, None).ensure_seeded().await?, SeedOutcome::Skipped);
        Ok(())
    }
}
