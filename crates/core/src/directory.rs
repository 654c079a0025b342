//! Persistence contract for users, organisations and memberships.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{DomainResult, NewOrganisation, NewUser, Organisation, OrganisationId, User, UserId};

/// Store of users, organisations and the many-to-many link between them.
///
/// Every call is fallible (`NotFound`, `Conflict`, `Unavailable`). Lookups
/// that may legitimately miss return `Ok(None)` instead of `NotFound`.
///
/// Implementations must enforce:
/// - unique emails (`create_user` fails with `Conflict`),
/// - at most one link per (user, organisation) pair (`add_membership` is
///   idempotent).
#[async_trait]
pub trait Directory: Send + Sync {
    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;

    async fn find_organisation_by_id(&self, id: OrganisationId)
    -> DomainResult<Option<Organisation>>;

    /// Organisations the user belongs to. `NotFound` if the user does not exist.
    async fn organisations_of(&self, user_id: UserId) -> DomainResult<Vec<Organisation>>;

    async fn create_user(&self, user: NewUser) -> DomainResult<User>;

    async fn create_organisation(&self, org: NewOrganisation) -> DomainResult<Organisation>;

    /// Link a user to an organisation. Linking an existing pair is a no-op.
    async fn add_membership(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<()>;

    async fn is_member(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<bool>;
}

#[async_trait]
impl<S> Directory for Arc<S>
where
    S: Directory + ?Sized,
{
    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        (**self).find_user_by_id(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        (**self).find_user_by_email(email).await
    }

    async fn find_organisation_by_id(
        &self,
        id: OrganisationId,
    ) -> DomainResult<Option<Organisation>> {
        (**self).find_organisation_by_id(id).await
    }

    async fn organisations_of(&self, user_id: UserId) -> DomainResult<Vec<Organisation>> {
        (**self).organisations_of(user_id).await
    }

    async fn create_user(&self, user: NewUser) -> DomainResult<User> {
        (**self).create_user(user).await
    }

    async fn create_organisation(&self, org: NewOrganisation) -> DomainResult<Organisation> {
        (**self).create_organisation(org).await
    }

    async fn add_membership(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<()> {
        (**self).add_membership(user_id, org_id).await
    }

    async fn is_member(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<bool> {
        (**self).is_member(user_id, org_id).await
    }
}
