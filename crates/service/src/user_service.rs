//! Staff account management across the three admin tiers.
//!
//! Placement rules: super admins place users anywhere (links validated),
//! agency admins are pinned to their agency, point admins to their point and
//! only manage operators.

use std::collections::HashMap;

use uuid::Uuid;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use models::{agency, agency_point, user, user_credentials};
use crate::auth::password::{self, PASSWORD_ALGORITHM};
use crate::errors::ServiceError;
use crate::non_blank;
use crate::pagination::{Page, Pagination};
use crate::scope::{CurrentUser, Role, Scope};

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    pub role: String,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    #[serde(default)]
    pub agency_point_id: Option<Uuid>,
}

/// Partial update; absent or blank fields keep their value.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub role: Option<String>,
    pub agency_id: Option<Uuid>,
    pub agency_point_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// User row enriched with the names of its agency and point.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(flatten)]
    pub user: user::Model,
    pub agency_name: Option<String>,
    pub agency_point_name: Option<String>,
}

pub async fn to_views(db: &DatabaseConnection, users: Vec<user::Model>) -> Result<Vec<UserView>, ServiceError> {
    let agency_ids: Vec<Uuid> = users.iter().filter_map(|u| u.agency_id).collect();
    let point_ids: Vec<Uuid> = users.iter().filter_map(|u| u.agency_point_id).collect();
    let agencies: HashMap<Uuid, String> = if agency_ids.is_empty() {
        HashMap::new()
    } else {
        agency::Entity::find()
            .filter(agency::Column::Id.is_in(agency_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect()
    };
    let points: HashMap<Uuid, String> = if point_ids.is_empty() {
        HashMap::new()
    } else {
        agency_point::Entity::find()
            .filter(agency_point::Column::Id.is_in(point_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect()
    };
    Ok(users
        .into_iter()
        .map(|u| UserView {
            agency_name: u.agency_id.and_then(|id| agencies.get(&id).cloned()),
            agency_point_name: u.agency_point_id.and_then(|id| points.get(&id).cloned()),
            user: u,
        })
        .collect())
}

pub async fn to_view(db: &DatabaseConnection, u: user::Model) -> Result<UserView, ServiceError> {
    let mut views = to_views(db, vec![u]).await?;
    views.pop().ok_or_else(|| ServiceError::not_found("user"))
}

/// Whether `actor` may see `target` at all.
fn visible_to(actor: &CurrentUser, target: &user::Model) -> bool {
    if !actor.scope.allows_user(target.agency_id, target.agency_point_id) {
        return false;
    }
    match actor.scope {
        Scope::Point { .. } => target.role == Role::AgencyOperator.as_str(),
        _ => true,
    }
}

fn scoped_query(actor: &CurrentUser) -> sea_orm::Select<user::Entity> {
    let q = user::Entity::find().order_by_asc(user::Column::CreatedAt);
    match actor.scope {
        Scope::Global => q,
        Scope::Agency { agency_id } => q.filter(user::Column::AgencyId.eq(agency_id)),
        Scope::Point { agency_id, agency_point_id } => q
            .filter(user::Column::AgencyId.eq(agency_id))
            .filter(user::Column::AgencyPointId.eq(agency_point_id))
            .filter(user::Column::Role.eq(Role::AgencyOperator.as_str())),
    }
}

pub async fn list_users(db: &DatabaseConnection, actor: &CurrentUser) -> Result<Vec<user::Model>, ServiceError> {
    Ok(scoped_query(actor).all(db).await?)
}

/// List users visible to `actor` with pagination.
pub async fn list_users_paginated(
    db: &DatabaseConnection,
    actor: &CurrentUser,
    opts: Pagination,
) -> Result<Page<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = scoped_query(actor).paginate(db, per_page);
    let total = paginator.num_items().await?;
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let users = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(users, total, opts))
}

pub async fn get_user(db: &DatabaseConnection, actor: &CurrentUser, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|u| visible_to(actor, u))
        .ok_or_else(|| ServiceError::not_found("user"))
}

async fn require_agency(db: &DatabaseConnection, id: Option<Uuid>, role: Role) -> Result<Uuid, ServiceError> {
    let id = id.ok_or_else(|| ServiceError::validation(format!("agencyId is required for role {}", role)))?;
    agency::Entity::find_by_id(id)
        .one(db)
        .await?
        .map(|a| a.id)
        .ok_or_else(|| ServiceError::validation("agency does not exist"))
}

async fn require_point_in(db: &DatabaseConnection, agency_id: Uuid, id: Option<Uuid>, role: Role) -> Result<Uuid, ServiceError> {
    let id = id.ok_or_else(|| ServiceError::validation(format!("agencyPointId is required for role {}", role)))?;
    agency_point::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|p| p.agency_id == agency_id)
        .map(|p| p.id)
        .ok_or_else(|| ServiceError::validation("agency point does not exist in this agency"))
}

/// Resolve the (agency, point) pair a user with `role` ends up attached to.
async fn placement(
    db: &DatabaseConnection,
    actor: &CurrentUser,
    role: Role,
    agency_id: Option<Uuid>,
    agency_point_id: Option<Uuid>,
) -> Result<(Option<Uuid>, Option<Uuid>), ServiceError> {
    match actor.scope {
        Scope::Global => {
            if !role.needs_agency() {
                return Ok((None, None));
            }
            let a = require_agency(db, agency_id, role).await?;
            if !role.needs_point() {
                return Ok((Some(a), None));
            }
            let p = require_point_in(db, a, agency_point_id, role).await?;
            Ok((Some(a), Some(p)))
        }
        Scope::Agency { agency_id: a } => {
            let p = require_point_in(db, a, agency_point_id, role).await?;
            Ok((Some(a), Some(p)))
        }
        Scope::Point { agency_id: a, agency_point_id: p } => Ok((Some(a), Some(p))),
    }
}

fn check_assignable(actor: &CurrentUser, role: Role) -> Result<(), ServiceError> {
    if actor.role.can_assign(role) {
        return Ok(());
    }
    let allowed: Vec<&str> = actor.role.creatable_roles().iter().map(Role::as_str).collect();
    Err(ServiceError::validation(format!("role {} not allowed; allowed roles: [{}]", role, allowed.join(", "))))
}

async fn ensure_email_free(db: &DatabaseConnection, email: &str, except: Option<Uuid>) -> Result<(), ServiceError> {
    if let Some(existing) = user::find_by_email(db, email).await? {
        if Some(existing.id) != except {
            return Err(ServiceError::Conflict(format!("email '{}' is already in use", user::normalize_email(email))));
        }
    }
    Ok(())
}

/// Create a user with a hashed password inside one transaction.
#[instrument(skip(db, actor, input), fields(actor = %actor.id, email = %input.email, role = %input.role))]
pub async fn create_user(db: &DatabaseConnection, actor: &CurrentUser, input: CreateUser) -> Result<user::Model, ServiceError> {
    let role = Role::parse(&input.role)?;
    check_assignable(actor, role)?;
    user::validate_email(&input.email)?;
    user::validate_name(&input.first_name, &input.last_name)?;
    password::validate_password(&input.password)?;
    ensure_email_free(db, &input.email, None).await?;
    let (agency_id, agency_point_id) = placement(db, actor, role, input.agency_id, input.agency_point_id).await?;

    let hash = password::hash_password(&input.password)?;
    let txn = db.begin().await?;
    let created = user::create(&txn, user::NewUser {
        email: input.email,
        first_name: input.first_name,
        last_name: input.last_name,
        phone_number: input.phone_number,
        role: role.to_string(),
        is_super_admin: role == Role::SuperAdmin,
        agency_id,
        agency_point_id,
        created_by_id: Some(actor.id),
    })
    .await?;
    user_credentials::upsert_password(&txn, created.id, hash, PASSWORD_ALGORITHM).await?;
    txn.commit().await?;

    info!(user_id = %created.id, role = %role, "user_created");
    Ok(created)
}

#[instrument(skip(db, actor, input), fields(actor = %actor.id, user_id = %id))]
pub async fn update_user(db: &DatabaseConnection, actor: &CurrentUser, id: Uuid, input: UpdateUser) -> Result<user::Model, ServiceError> {
    let current = get_user(db, actor, id).await?;
    let current_role = Role::parse(&current.role)?;
    if !actor.role.can_assign(current_role) {
        return Err(ServiceError::forbidden(format!("cannot modify a user with role {}", current_role)));
    }

    let role = match non_blank(input.role) {
        Some(r) => {
            let r = Role::parse(&r)?;
            check_assignable(actor, r)?;
            r
        }
        None => current_role,
    };

    let (agency_id, agency_point_id) = match actor.scope {
        Scope::Point { .. } => {
            if input.agency_id.is_some() || input.agency_point_id.is_some() {
                return Err(ServiceError::validation("agency and agency point cannot be changed"));
            }
            (current.agency_id, current.agency_point_id)
        }
        Scope::Agency { agency_id: a } => {
            if input.agency_id.is_some_and(|other| other != a) {
                return Err(ServiceError::validation("users cannot be moved to another agency"));
            }
            placement(db, actor, role, Some(a), input.agency_point_id.or(current.agency_point_id)).await?
        }
        Scope::Global => {
            placement(
                db,
                actor,
                role,
                input.agency_id.or(current.agency_id),
                input.agency_point_id.or(current.agency_point_id),
            )
            .await?
        }
    };

    let mut am: user::ActiveModel = current.into();
    if let Some(email) = non_blank(input.email) {
        user::validate_email(&email)?;
        ensure_email_free(db, &email, Some(id)).await?;
        am.email = Set(user::normalize_email(&email));
    }
    if let Some(first) = non_blank(input.first_name) { am.first_name = Set(first); }
    if let Some(last) = non_blank(input.last_name) { am.last_name = Set(last); }
    if let Some(phone) = non_blank(input.phone_number) { am.phone_number = Set(phone); }
    if let Some(active) = input.is_active {
        if !active && id == actor.id {
            return Err(ServiceError::validation("you cannot suspend your own account"));
        }
        am.is_active = Set(active);
    }
    am.role = Set(role.to_string());
    am.is_super_admin = Set(role == Role::SuperAdmin);
    am.agency_id = Set(agency_id);
    am.agency_point_id = Set(agency_point_id);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(user_id = %id, role = %role, "user_updated");
    Ok(updated)
}

/// Activate or suspend a user. Suspended users can no longer log in.
#[instrument(skip(db, actor), fields(actor = %actor.id, user_id = %id))]
pub async fn set_user_active(db: &DatabaseConnection, actor: &CurrentUser, id: Uuid, active: bool) -> Result<user::Model, ServiceError> {
    let current = get_user(db, actor, id).await?;
    let current_role = Role::parse(&current.role)?;
    if !actor.role.can_assign(current_role) {
        return Err(ServiceError::forbidden(format!("cannot modify a user with role {}", current_role)));
    }
    if !active && id == actor.id {
        return Err(ServiceError::validation("you cannot suspend your own account"));
    }
    let updated = user::set_active(db, id, active).await?;
    info!(user_id = %id, active, "user_status_changed");
    Ok(updated)
}
