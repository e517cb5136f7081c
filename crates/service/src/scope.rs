//! Tenant scope model: who may see and touch which rows.
//!
//! Every request resolves a [`CurrentUser`] from the store (never from token
//! claims alone). Services then filter queries through its [`Scope`] and check
//! role assignments through [`Role::can_assign`].

use std::fmt;
use std::str::FromStr;

use sea_orm::{DatabaseConnection, EntityTrait};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use models::user;
use crate::errors::ServiceError;

/// Staff roles ordered from least to most privileged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    AgencyOperator,
    AgencyPointAdmin,
    AgencyGlobalAdmin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::SuperAdmin,
        Role::AgencyGlobalAdmin,
        Role::AgencyPointAdmin,
        Role::AgencyOperator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::AgencyGlobalAdmin => "AgencyGlobalAdmin",
            Role::AgencyPointAdmin => "AgencyPointAdmin",
            Role::AgencyOperator => "AgencyOperator",
        }
    }

    pub fn parse(s: &str) -> Result<Role, ServiceError> {
        match s.trim() {
            "SuperAdmin" => Ok(Role::SuperAdmin),
            "AgencyGlobalAdmin" => Ok(Role::AgencyGlobalAdmin),
            "AgencyPointAdmin" => Ok(Role::AgencyPointAdmin),
            "AgencyOperator" => Ok(Role::AgencyOperator),
            other => Err(ServiceError::validation(format!("unknown role: {}", other))),
        }
    }

    /// Roles this role may create or assign to others.
    pub fn creatable_roles(&self) -> &'static [Role] {
        match self {
            Role::SuperAdmin => &Role::ALL,
            Role::AgencyGlobalAdmin => &[Role::AgencyPointAdmin, Role::AgencyOperator],
            Role::AgencyPointAdmin => &[Role::AgencyOperator],
            Role::AgencyOperator => &[],
        }
    }

    pub fn can_assign(&self, target: Role) -> bool { self.creatable_roles().contains(&target) }

    pub fn needs_agency(&self) -> bool { !matches!(self, Role::SuperAdmin) }

    pub fn needs_point(&self) -> bool { matches!(self, Role::AgencyPointAdmin | Role::AgencyOperator) }

    /// Dashboard landing path for session logins.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "/SuperAdmin/Dashboard",
            Role::AgencyGlobalAdmin => "/GlobalAdmin/Dashboard",
            Role::AgencyPointAdmin => "/PointAdmin/Dashboard",
            Role::AgencyOperator => "/Operator/Dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
    type Err = ServiceError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Role::parse(s) }
}

/// Data-visibility boundary derived from a user's role and tenant links.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Global,
    Agency { agency_id: Uuid },
    Point { agency_id: Uuid, agency_point_id: Uuid },
}

impl Scope {
    pub fn for_user(role: Role, agency_id: Option<Uuid>, agency_point_id: Option<Uuid>) -> Result<Scope, ServiceError> {
        match (role, agency_id, agency_point_id) {
            (Role::SuperAdmin, _, _) => Ok(Scope::Global),
            (Role::AgencyGlobalAdmin, Some(agency_id), _) => Ok(Scope::Agency { agency_id }),
            (Role::AgencyGlobalAdmin, None, _) => Err(ServiceError::forbidden("user is not attached to an agency")),
            (_, Some(agency_id), Some(agency_point_id)) => Ok(Scope::Point { agency_id, agency_point_id }),
            _ => Err(ServiceError::forbidden("user is not attached to an agency point")),
        }
    }

    pub fn agency_id(&self) -> Option<Uuid> {
        match self {
            Scope::Global => None,
            Scope::Agency { agency_id } | Scope::Point { agency_id, .. } => Some(*agency_id),
        }
    }

    pub fn agency_point_id(&self) -> Option<Uuid> {
        match self {
            Scope::Point { agency_point_id, .. } => Some(*agency_point_id),
            _ => None,
        }
    }

    pub fn is_global(&self) -> bool { matches!(self, Scope::Global) }

    pub fn allows_agency(&self, id: Uuid) -> bool {
        match self {
            Scope::Global => true,
            Scope::Agency { agency_id } | Scope::Point { agency_id, .. } => *agency_id == id,
        }
    }

    pub fn allows_point(&self, agency_id: Uuid, point_id: Uuid) -> bool {
        match self {
            Scope::Global => true,
            Scope::Agency { agency_id: a } => *a == agency_id,
            Scope::Point { agency_id: a, agency_point_id: p } => *a == agency_id && *p == point_id,
        }
    }

    pub fn allows_user(&self, agency_id: Option<Uuid>, point_id: Option<Uuid>) -> bool {
        match self {
            Scope::Global => true,
            Scope::Agency { agency_id: a } => agency_id == Some(*a),
            Scope::Point { agency_id: a, agency_point_id: p } => agency_id == Some(*a) && point_id == Some(*p),
        }
    }

    /// Agency id or `Forbidden` for the global scope.
    pub fn require_agency(&self) -> Result<Uuid, ServiceError> {
        self.agency_id().ok_or_else(|| ServiceError::forbidden("operation requires an agency scope"))
    }

    pub fn require_point(&self) -> Result<(Uuid, Uuid), ServiceError> {
        match self {
            Scope::Point { agency_id, agency_point_id } => Ok((*agency_id, *agency_point_id)),
            _ => Err(ServiceError::forbidden("operation requires an agency point scope")),
        }
    }
}

/// Caller identity as loaded from the store.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub scope: Scope,
}

impl CurrentUser {
    pub fn from_model(u: &user::Model) -> Result<CurrentUser, ServiceError> {
        let role = Role::parse(&u.role)?;
        let scope = Scope::for_user(role, u.agency_id, u.agency_point_id)?;
        Ok(CurrentUser { id: u.id, email: u.email.clone(), role, scope })
    }
}

/// Reload the caller and derive its scope. Missing or suspended users are rejected.
pub async fn resolve_scope(db: &DatabaseConnection, user_id: Uuid) -> Result<CurrentUser, ServiceError> {
    let found = user::Entity::find_by_id(user_id).one(db).await?;
    let u = found.ok_or_else(|| ServiceError::forbidden("user no longer exists"))?;
    if !u.is_active {
        debug!(user_id = %u.id, "inactive user rejected");
        return Err(ServiceError::forbidden("user is suspended"));
    }
    CurrentUser::from_model(&u)
}
