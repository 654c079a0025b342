//! Application services: the use cases behind each route.
//!
//! Handlers validate and parse input, then call exactly one method here.
//! Everything below works on domain types and returns `ServiceError`.

use std::sync::Arc;

use thiserror::Error;

use orgdesk_auth::{
    AuthzError, MembershipAuthorizer, PasswordError, PasswordHasher, Principal, TokenError,
    TokenService,
};
use orgdesk_core::{
    Directory, DomainError, NewOrganisation, NewUser, Organisation, OrganisationId, User, UserId,
};
use orgdesk_infra::{AppConfig, InMemoryDirectory, PostgresDirectory};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("user with email {0} already exists")]
    EmailTaken(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::Unavailable(msg) => Self::Unavailable(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Forbidden(reason) => Self::Forbidden(reason),
            AuthzError::NotFound(what) => Self::NotFound(what),
            AuthzError::Store(e) => e.into(),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Input to [`AppServices::register`], already validated.
#[derive(Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// A signed-in user and their fresh access token.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

pub struct AppServices {
    directory: Arc<dyn Directory>,
    tokens: Arc<TokenService>,
    passwords: PasswordHasher,
    authorizer: MembershipAuthorizer<Arc<dyn Directory>>,
}

impl AppServices {
    pub fn new(directory: Arc<dyn Directory>, tokens: TokenService) -> Self {
        Self {
            authorizer: MembershipAuthorizer::new(directory.clone()),
            directory,
            tokens: Arc::new(tokens),
            passwords: PasswordHasher::new(),
        }
    }

    /// Process-local wiring with default token lifetime.
    pub fn in_memory(secret: impl AsRef<[u8]>) -> Self {
        Self::new(Arc::new(InMemoryDirectory::new()), TokenService::new(secret))
    }

    /// Postgres when `DATABASE_URL` is configured, in-memory otherwise.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DomainError> {
        let directory: Arc<dyn Directory> = match &config.database_url {
            Some(url) => Arc::new(PostgresDirectory::connect(url).await?),
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory directory");
                Arc::new(InMemoryDirectory::new())
            }
        };

        let tokens = TokenService::new(&config.app_secret)
            .with_ttl(chrono::Duration::seconds(config.token_ttl_secs));

        Ok(Self::new(directory, tokens))
    }

    pub fn with_password_hasher(mut self, passwords: PasswordHasher) -> Self {
        self.passwords = passwords;
        self
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    /// Create a user with a personal organisation and sign them in.
    pub async fn register(&self, input: Registration) -> Result<Session, ServiceError> {
        if self.directory.find_user_by_email(&input.email).await?.is_some() {
            return Err(ServiceError::EmailTaken(input.email));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let email = input.email.clone();
        let user = self
            .directory
            .create_user(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                phone: input.phone,
            })
            .await
            .map_err(|e| match e {
                // Lost a race with a concurrent registration.
                DomainError::Conflict(_) => ServiceError::EmailTaken(email),
                other => other.into(),
            })?;

        let org = self
            .directory
            .create_organisation(NewOrganisation::default_for(&user.first_name, &user.last_name))
            .await?;
        self.directory.add_membership(user.id, org.id).await?;

        tracing::info!(user_id = %user.id, org_id = %org.id, "user registered");
        self.start_session(user.id).await
    }

    /// Exchange credentials for a session. Every failure looks the same to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ServiceError> {
        let Some(user) = self.directory.find_user_by_email(email).await? else {
            return Err(ServiceError::AuthenticationFailed);
        };

        match self.passwords.verify(password, &user.password_hash) {
            Ok(()) => {}
            Err(PasswordError::Hash(e)) => {
                tracing::warn!(user_id = %user.id, error = %e, "stored password hash unusable");
                return Err(ServiceError::AuthenticationFailed);
            }
            Err(_) => return Err(ServiceError::AuthenticationFailed),
        }

        let access_token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(Session { access_token, user })
    }

    pub async fn user_profile(
        &self,
        requester: &Principal,
        target: UserId,
    ) -> Result<User, ServiceError> {
        Ok(self.authorizer.can_view_user(requester, target).await?)
    }

    /// Current memberships of the requester, read from the store.
    pub async fn organisations(&self, requester: &Principal) -> Result<Vec<Organisation>, ServiceError> {
        Ok(self.directory.organisations_of(requester.user_id).await?)
    }

    /// An organisation the requester belongs to. Non-members get `NotFound`.
    pub async fn organisation(
        &self,
        requester: &Principal,
        org_id: OrganisationId,
    ) -> Result<Organisation, ServiceError> {
        if !self.directory.is_member(requester.user_id, org_id).await? {
            return Err(ServiceError::NotFound("organisation"));
        }
        self.directory
            .find_organisation_by_id(org_id)
            .await?
            .ok_or(ServiceError::NotFound("organisation"))
    }

    pub async fn create_organisation(
        &self,
        requester: &Principal,
        name: String,
        description: Option<String>,
    ) -> Result<Organisation, ServiceError> {
        let org = self
            .directory
            .create_organisation(NewOrganisation { name, description })
            .await?;
        self.directory.add_membership(requester.user_id, org.id).await?;

        tracing::info!(org_id = %org.id, created_by = %requester.user_id, "organisation created");
        Ok(org)
    }

    pub async fn add_member(
        &self,
        requester: &Principal,
        org_id: OrganisationId,
        user_id: UserId,
    ) -> Result<(), ServiceError> {
        Ok(self.authorizer.can_add_member(requester, org_id, user_id).await?)
    }

    async fn start_session(&self, user_id: UserId) -> Result<Session, ServiceError> {
        let user = self
            .directory
            .find_user_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("user"))?;
        let access_token = self.tokens.issue(&user)?;
        Ok(Session { access_token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::Params;

    fn services() -> AppServices {
        AppServices::in_memory("service-secret").with_password_hasher(PasswordHasher::with_params(
            Params::new(8, 1, 1, None).unwrap(),
        ))
    }

    fn john() -> Registration {
        Registration {
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@x.com".into(),
            password: "password123".into(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn registration_creates_a_personal_organisation() {
        let svc = services();
        let session = svc.register(john()).await.unwrap();

        assert!(!session.access_token.is_empty());
        assert_eq!(session.user.organisations.len(), 1);
        assert_eq!(session.user.organisations[0].name, "John's Organisation");

        let principal = svc
            .tokens()
            .verify(&format!("Bearer {}", session.access_token))
            .unwrap();
        assert_eq!(principal.organisation_ids, session.user.organisation_ids());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let svc = services();
        svc.register(john()).await.unwrap();
        assert_eq!(
            svc.register(john()).await.unwrap_err(),
            ServiceError::EmailTaken("john@x.com".into())
        );
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let svc = services();
        svc.register(john()).await.unwrap();

        for (email, password) in [
            ("john@x.com", "wrong-password"),
            ("john@x.com", "short"),
            ("nobody@x.com", "password123"),
        ] {
            assert_eq!(
                svc.login(email, password).await.unwrap_err(),
                ServiceError::AuthenticationFailed
            );
        }

        let session = svc.login("john@x.com", "password123").await.unwrap();
        assert_eq!(session.user.email, "john@x.com");
    }

    #[tokio::test]
    async fn non_members_cannot_read_an_organisation() {
        let svc = services();
        let john = svc.register(john()).await.unwrap();
        let mut jane = self::john();
        jane.first_name = "Jane".into();
        jane.email = "jane@x.com".into();
        let jane = svc.register(jane).await.unwrap();

        let john_principal = svc
            .tokens()
            .verify(&format!("Bearer {}", john.access_token))
            .unwrap();
        let jane_org = jane.user.organisations[0].id;

        assert_eq!(
            svc.organisation(&john_principal, jane_org).await.unwrap_err(),
            ServiceError::NotFound("organisation")
        );
    }

    #[tokio::test]
    async fn created_organisation_lists_for_creator() {
        let svc = services();
        let john = svc.register(john()).await.unwrap();
        let principal = svc
            .tokens()
            .verify(&format!("Bearer {}", john.access_token))
            .unwrap();

        let org = svc
            .create_organisation(&principal, "Side Project".into(), Some("weekend".into()))
            .await
            .unwrap();

        let orgs = svc.organisations(&principal).await.unwrap();
        assert_eq!(orgs.len(), 2);
        assert!(orgs.contains(&org));
        assert_eq!(svc.organisation(&principal, org.id).await.unwrap(), org);
    }

    #[test]
    fn authz_errors_keep_their_meaning() {
        assert_eq!(
            ServiceError::from(AuthzError::Forbidden("no shared organisation")),
            ServiceError::Forbidden("no shared organisation")
        );
        assert_eq!(
            ServiceError::from(AuthzError::Store(DomainError::unavailable("down"))),
            ServiceError::Unavailable("down".into())
        );
    }
}
