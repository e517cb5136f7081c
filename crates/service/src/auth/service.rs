use std::sync::Arc;

use tracing::{info, debug, warn, instrument};
use uuid::Uuid;

use super::domain::{AuthSession, AuthUser, LoginInput, NewAuthUser, RegisterSuperAdminInput};
use super::errors::AuthError;
use super::password::{self, PASSWORD_ALGORITHM};
use super::repository::AuthRepository;
use super::token::{Claims, JwtKeys};
use crate::scope::Role;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt: configs::JwtConfig,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt: configs::JwtConfig) -> Self {
        Self { jwt, password_algorithm: PASSWORD_ALGORITHM.into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    keys: JwtKeys,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self {
        Self { repo, keys: JwtKeys::new(&cfg.jwt), cfg }
    }

    pub fn keys(&self) -> &JwtKeys { &self.keys }

    /// Authenticate by email and password and issue a token.
    ///
    /// Unknown email and wrong password are indistinguishable. Suspended
    /// accounts are reported only after the password matched.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthConfig, AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{LoginInput, RegisterSuperAdminInput};
    /// use std::sync::Arc;
    /// let jwt = configs::JwtConfig { secret: "secret".into(), ..Default::default() };
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new(jwt));
    /// let input = RegisterSuperAdminInput { email: "root@e.com".into(), password: "Passw0rd".into(), first_name: "R".into(), last_name: "A".into() };
    /// tokio_test::block_on(svc.register_superadmin(input)).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "ROOT@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "root@e.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !password::verify_password(&input.password, &cred.password_hash)? {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }
        if !user.is_active {
            warn!(user_id = %user.id, "login_rejected_inactive");
            return Err(AuthError::Inactive);
        }

        self.repo.record_login(user.id).await?;
        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, role = %user.role, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Dashboard login: same as [`login`](Self::login) but the account must hold `role`.
    #[instrument(skip(self, input), fields(email = %input.email, role = %role))]
    pub async fn login_with_role(&self, input: LoginInput, role: Role) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password required".into()));
        }
        let session = self.login(input).await?;
        if session.user.role != role {
            debug!(user_id = %session.user.id, actual = %session.user.role, "role mismatch on dashboard login");
            return Err(AuthError::Unauthorized);
        }
        Ok(session)
    }

    /// Bootstrap the first super administrator. Refused once one exists.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register_superadmin(&self, input: RegisterSuperAdminInput) -> Result<AuthSession, AuthError> {
        if self.repo.super_admin_exists().await? {
            return Err(AuthError::Forbidden("a super administrator already exists".into()));
        }
        models::user::validate_email(&input.email)?;
        password::validate_password(&input.password)?;
        if self.repo.find_user_by_email(&input.email).await?.is_some() {
            return Err(AuthError::Conflict);
        }

        let first_name = if input.first_name.trim().is_empty() { "Super".to_string() } else { input.first_name };
        let last_name = if input.last_name.trim().is_empty() { "Admin".to_string() } else { input.last_name };
        let hash = password::hash_password(&input.password)?;
        // the repository re-checks both conditions above inside its transaction
        let user = self.repo.create_first_super_admin(
            NewAuthUser {
                email: input.email,
                first_name,
                last_name,
                role: Role::SuperAdmin,
                agency_id: None,
                agency_point_id: None,
            },
            hash,
            self.cfg.password_algorithm.clone(),
        ).await?;

        let token = self.keys.issue(&user)?;
        info!(user_id = %user.id, email = %user.email, "superadmin_registered");
        Ok(AuthSession { user, token })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> { self.keys.verify(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> (Arc<MockAuthRepository>, AuthService<MockAuthRepository>) {
        let repo = Arc::new(MockAuthRepository::default());
        let jwt = configs::JwtConfig { secret: "unit-secret".into(), ..Default::default() };
        let svc = AuthService::new(repo.clone(), AuthConfig::new(jwt));
        (repo, svc)
    }

    fn root() -> RegisterSuperAdminInput {
        RegisterSuperAdminInput {
            email: "root@travel.test".into(),
            password: "rootpw".into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn creds(email: &str, password: &str) -> LoginInput {
        LoginInput { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn register_superadmin_only_once() {
        let (_, svc) = svc();
        let session = svc.register_superadmin(root()).await.unwrap();
        assert_eq!(session.user.role, Role::SuperAdmin);
        assert!(session.user.is_super_admin);
        assert_eq!(session.user.full_name(), "Super Admin");

        let mut again = root();
        again.email = "second@travel.test".into();
        let err = svc.register_superadmin(again).await.unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let (_, svc) = svc();
        let mut input = root();
        input.password = "123".into();
        assert!(matches!(svc.register_superadmin(input).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn login_checks_password_and_records_login() {
        let (repo, svc) = svc();
        let registered = svc.register_superadmin(root()).await.unwrap();

        assert!(matches!(svc.login(creds("root@travel.test", "nope!!")).await, Err(AuthError::Unauthorized)));
        assert!(matches!(svc.login(creds("ghost@travel.test", "rootpw")).await, Err(AuthError::Unauthorized)));

        let session = svc.login(creds("Root@Travel.test", "rootpw")).await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
        assert_eq!(repo.login_count(registered.user.id), 1);

        let claims = svc.verify_token(&session.token).unwrap();
        assert_eq!(claims.role, "SuperAdmin");
        assert!(claims.is_super_admin);
        assert_eq!(claims.iss, "TravelSaaS");
        assert_eq!(claims.aud, "TravelSaaSUsers");
    }

    #[tokio::test]
    async fn suspended_user_cannot_login() {
        let (repo, svc) = svc();
        svc.register_superadmin(root()).await.unwrap();
        repo.set_active("root@travel.test", false);
        assert!(matches!(svc.login(creds("root@travel.test", "rootpw")).await, Err(AuthError::Inactive)));
    }

    #[tokio::test]
    async fn dashboard_login_requires_matching_role() {
        let (_, svc) = svc();
        svc.register_superadmin(root()).await.unwrap();
        assert!(svc.login_with_role(creds("root@travel.test", "rootpw"), Role::SuperAdmin).await.is_ok());
        assert!(matches!(
            svc.login_with_role(creds("root@travel.test", "rootpw"), Role::AgencyOperator).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            svc.login_with_role(creds("", ""), Role::SuperAdmin).await,
            Err(AuthError::Validation(_))
        ));
    }
}
