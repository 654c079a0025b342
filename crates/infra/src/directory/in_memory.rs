use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use orgdesk_core::{
    Directory, DomainError, DomainResult, Entity, NewOrganisation, NewUser, Organisation,
    OrganisationId, User, UserId,
};

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, UserRecord>,
    users_by_email: HashMap<String, UserId>,
    organisations: HashMap<OrganisationId, Organisation>,
    /// Membership links in insertion order; never holds a pair twice.
    memberships: Vec<(UserId, OrganisationId)>,
}

impl State {
    fn organisations_of(&self, user_id: UserId) -> Vec<Organisation> {
        self.memberships
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, o)| self.organisations.get(o).cloned())
            .collect()
    }

    fn hydrate(&self, record: &UserRecord) -> User {
        User {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            password_hash: record.password_hash.clone(),
            phone: record.phone.clone(),
            organisations: self.organisations_of(record.id),
            created_at: record.created_at,
        }
    }
}

/// In-memory directory for tests/dev.
///
/// A single lock guards all maps, so every operation (including the
/// check-then-insert in `add_membership`) is atomic.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of membership links (test helper for idempotency checks).
    pub fn membership_count(&self, user_id: UserId, org_id: OrganisationId) -> usize {
        self.read()
            .map(|s| {
                s.memberships
                    .iter()
                    .filter(|link| **link == (user_id, org_id))
                    .count()
            })
            .unwrap_or(0)
    }

    fn read(&self) -> DomainResult<RwLockReadGuard<'_, State>> {
        self.inner
            .read()
            .map_err(|_| DomainError::unavailable("directory lock poisoned"))
    }

    fn write(&self) -> DomainResult<RwLockWriteGuard<'_, State>> {
        self.inner
            .write()
            .map_err(|_| DomainError::unavailable("directory lock poisoned"))
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_user_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.get(&id).map(|r| state.hydrate(r)))
    }

    async fn find_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let state = self.read()?;
        Ok(state
            .users_by_email
            .get(email)
            .and_then(|id| state.users.get(id))
            .map(|r| state.hydrate(r)))
    }

    async fn find_organisation_by_id(
        &self,
        id: OrganisationId,
    ) -> DomainResult<Option<Organisation>> {
        Ok(self.read()?.organisations.get(&id).cloned())
    }

    async fn organisations_of(&self, user_id: UserId) -> DomainResult<Vec<Organisation>> {
        let state = self.read()?;
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::not_found("user"));
        }
        Ok(state.organisations_of(user_id))
    }

    async fn create_user(&self, user: NewUser) -> DomainResult<User> {
        let mut state = self.write()?;
        if state.users_by_email.contains_key(&user.email) {
            return Err(DomainError::conflict(format!(
                "user with email {} already exists",
                user.email
            )));
        }

        let record = UserRecord {
            id: UserId::new(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            created_at: Utc::now(),
        };
        state.users_by_email.insert(record.email.clone(), record.id);
        state.users.insert(record.id, record.clone());

        Ok(state.hydrate(&record))
    }

    async fn create_organisation(&self, org: NewOrganisation) -> DomainResult<Organisation> {
        let org = Organisation {
            id: OrganisationId::new(),
            name: org.name,
            description: org.description,
            created_at: Utc::now(),
        };
        self.write()?.organisations.insert(org.id(), org.clone());
        Ok(org)
    }

    async fn add_membership(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<()> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::not_found("user"));
        }
        if !state.organisations.contains_key(&org_id) {
            return Err(DomainError::not_found("organisation"));
        }

        let link = (user_id, org_id);
        if !state.memberships.contains(&link) {
            state.memberships.push(link);
        }
        Ok(())
    }

    async fn is_member(&self, user_id: UserId, org_id: OrganisationId) -> DomainResult<bool> {
        Ok(self.read()?.memberships.contains(&(user_id, org_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Jane".into(),
            last_name: "Roe".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: None,
        }
    }

    fn new_org(name: &str) -> NewOrganisation {
        NewOrganisation {
            name: name.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let dir = InMemoryDirectory::new();
        dir.create_user(new_user("jane@example.com")).await.unwrap();

        let err = dir
            .create_user(new_user("jane@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn users_are_found_by_id_and_email() {
        let dir = InMemoryDirectory::new();
        let created = dir.create_user(new_user("jane@example.com")).await.unwrap();

        let by_id = dir.find_user_by_id(created.id).await.unwrap().unwrap();
        let by_email = dir
            .find_user_by_email("jane@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_email, created);

        assert!(dir.find_user_by_id(UserId::new()).await.unwrap().is_none());
        assert!(dir.find_user_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn membership_is_idempotent_and_visible_on_user() {
        let dir = InMemoryDirectory::new();
        let user = dir.create_user(new_user("jane@example.com")).await.unwrap();
        let org = dir.create_organisation(new_org("Acme")).await.unwrap();

        dir.add_membership(user.id, org.id).await.unwrap();
        dir.add_membership(user.id, org.id).await.unwrap();

        assert_eq!(dir.membership_count(user.id, org.id), 1);
        assert!(dir.is_member(user.id, org.id).await.unwrap());

        let reloaded = dir.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.organisations, vec![org]);
    }

    #[tokio::test]
    async fn membership_requires_both_ends() {
        let dir = InMemoryDirectory::new();
        let user = dir.create_user(new_user("jane@example.com")).await.unwrap();
        let org = dir.create_organisation(new_org("Acme")).await.unwrap();

        assert_eq!(
            dir.add_membership(UserId::new(), org.id).await,
            Err(DomainError::NotFound("user"))
        );
        assert_eq!(
            dir.add_membership(user.id, OrganisationId::new()).await,
            Err(DomainError::NotFound("organisation"))
        );
    }

    #[tokio::test]
    async fn organisations_of_unknown_user_is_not_found() {
        let dir = InMemoryDirectory::new();
        assert_eq!(
            dir.organisations_of(UserId::new()).await,
            Err(DomainError::NotFound("user"))
        );
    }
}
