use std::collections::HashSet;

use thiserror::Error;

use orgdesk_core::{Directory, DomainError, OrganisationId, User, UserId};

use crate::Principal;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The directory failed for a reason other than a missing record.
    #[error(transparent)]
    Store(DomainError),
}

impl From<DomainError> for AuthzError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(what) => Self::NotFound(what),
            other => Self::Store(other),
        }
    }
}

/// True iff the two membership sets intersect.
///
/// Order and duplicates in either slice are irrelevant.
pub fn shares_organisation(a: &[OrganisationId], b: &[OrganisationId]) -> bool {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let lookup: HashSet<&OrganisationId> = small.iter().collect();
    large.iter().any(|id| lookup.contains(id))
}

/// Membership-based access decisions.
///
/// Trust is flat: every member of an organisation may see fellow members and
/// add new ones. Membership is always re-read from the directory rather than
/// taken from the token, so these checks never act on stale claims.
#[derive(Debug, Clone)]
pub struct MembershipAuthorizer<D> {
    directory: D,
}

impl<D: Directory> MembershipAuthorizer<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Return `target`'s record if the requester shares an organisation with them.
    pub async fn can_view_user(
        &self,
        requester: &Principal,
        target: UserId,
    ) -> Result<User, AuthzError> {
        let target_user = self
            .directory
            .find_user_by_id(target)
            .await?
            .ok_or(AuthzError::NotFound("user"))?;

        let requester_orgs = match self.directory.organisations_of(requester.user_id).await {
            Ok(orgs) => orgs,
            // A token can outlive its user.
            Err(DomainError::NotFound(_)) => {
                return Err(AuthzError::Forbidden("requester no longer exists"));
            }
            Err(e) => return Err(e.into()),
        };
        let requester_ids: Vec<OrganisationId> = requester_orgs.iter().map(|o| o.id).collect();

        if shares_organisation(&requester_ids, &target_user.organisation_ids()) {
            Ok(target_user)
        } else {
            tracing::info!(
                requester = %requester.user_id,
                target = %target,
                "user lookup denied: no shared organisation"
            );
            Err(AuthzError::Forbidden("no shared organisation"))
        }
    }

    /// Add `new_user` to `org_id` on behalf of an existing member.
    ///
    /// Re-adding an existing member succeeds without creating a second link.
    pub async fn can_add_member(
        &self,
        requester: &Principal,
        org_id: OrganisationId,
        new_user: UserId,
    ) -> Result<(), AuthzError> {
        self.directory
            .find_user_by_id(new_user)
            .await?
            .ok_or(AuthzError::NotFound("user"))?;

        self.directory
            .find_organisation_by_id(org_id)
            .await?
            .ok_or(AuthzError::NotFound("organisation"))?;

        if !self.directory.is_member(requester.user_id, org_id).await? {
            tracing::info!(
                requester = %requester.user_id,
                org_id = %org_id,
                "add member denied: requester is not a member"
            );
            return Err(AuthzError::Forbidden(
                "requester is not a member of the organisation",
            ));
        }

        self.directory.add_membership(new_user, org_id).await?;
        tracing::info!(org_id = %org_id, user_id = %new_user, added_by = %requester.user_id, "member added");
        Ok(())
    }
}
