//! Integration tests for the access pipeline.
//!
//! Tests: Directory → TokenService → Principal → MembershipAuthorizer
//!
//! Verifies:
//! - Membership decisions are read from the directory, not the token
//! - Adding a member is idempotent
//! - Users in disjoint organisations cannot see each other

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use orgdesk_auth::{AuthzError, MembershipAuthorizer, Principal, TokenService};
    use orgdesk_core::{Directory, NewOrganisation, NewUser, Organisation, User};

    use crate::directory::InMemoryDirectory;

    const SECRET: &str = "integration-secret";

    struct Fixture {
        directory: Arc<InMemoryDirectory>,
        tokens: TokenService,
        authorizer: MembershipAuthorizer<Arc<InMemoryDirectory>>,
    }

    fn setup() -> Fixture {
        let directory = Arc::new(InMemoryDirectory::new());
        Fixture {
            authorizer: MembershipAuthorizer::new(directory.clone()),
            tokens: TokenService::new(SECRET),
            directory,
        }
    }

    impl Fixture {
        /// Create a user with a personal organisation, the way registration does.
        async fn register(&self, first: &str, email: &str) -> (User, Organisation) {
            let user = self
                .directory
                .create_user(NewUser {
                    first_name: first.into(),
                    last_name: "Tester".into(),
                    email: email.into(),
                    password_hash: "unused".into(),
                    phone: None,
                })
                .await
                .unwrap();
            let org = self
                .directory
                .create_organisation(NewOrganisation::default_for(first, "Tester"))
                .await
                .unwrap();
            self.directory.add_membership(user.id, org.id).await.unwrap();
            (user, org)
        }

        async fn login(&self, user: &User) -> Principal {
            let fresh = self.directory.find_user_by_id(user.id).await.unwrap().unwrap();
            let token = self.tokens.issue(&fresh).unwrap();
            self.tokens.verify(&format!("Bearer {token}")).unwrap()
        }
    }

    #[tokio::test]
    async fn strangers_cannot_view_each_other_until_they_share_an_org() {
        let fx = setup();
        let (alice, alice_org) = fx.register("Alice", "alice@example.com").await;
        let (bob, _) = fx.register("Bob", "bob@example.com").await;
        let alice_session = fx.login(&alice).await;

        let err = fx.authorizer.can_view_user(&alice_session, bob.id).await.unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));

        fx.authorizer
            .can_add_member(&alice_session, alice_org.id, bob.id)
            .await
            .unwrap();

        // Same session: the token predates the new membership.
        let seen = fx.authorizer.can_view_user(&alice_session, bob.id).await.unwrap();
        assert_eq!(seen.id, bob.id);
        assert!(seen.is_member_of(alice_org.id));
    }

    #[tokio::test]
    async fn adding_a_member_twice_leaves_one_link() {
        let fx = setup();
        let (alice, alice_org) = fx.register("Alice", "alice@example.com").await;
        let (bob, _) = fx.register("Bob", "bob@example.com").await;
        let session = fx.login(&alice).await;

        for _ in 0..2 {
            fx.authorizer
                .can_add_member(&session, alice_org.id, bob.id)
                .await
                .unwrap();
        }

        assert_eq!(fx.directory.membership_count(bob.id, alice_org.id), 1);
        let bob_orgs = fx.directory.organisations_of(bob.id).await.unwrap();
        assert_eq!(bob_orgs.len(), 2);
    }

    #[tokio::test]
    async fn non_members_cannot_add_to_an_organisation() {
        let fx = setup();
        let (alice, _) = fx.register("Alice", "alice@example.com").await;
        let (bob, bob_org) = fx.register("Bob", "bob@example.com").await;
        let (carol, _) = fx.register("Carol", "carol@example.com").await;
        let session = fx.login(&alice).await;

        let err = fx
            .authorizer
            .can_add_member(&session, bob_org.id, carol.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthzError::Forbidden(_)));
        assert!(!fx.directory.is_member(carol.id, bob_org.id).await.unwrap());
        assert!(fx.directory.is_member(bob.id, bob_org.id).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let fx = setup();
        let (alice, alice_org) = fx.register("Alice", "alice@example.com").await;
        let session = fx.login(&alice).await;

        let missing_user = orgdesk_core::UserId::new();
        assert_eq!(
            fx.authorizer.can_view_user(&session, missing_user).await,
            Err(AuthzError::NotFound("user"))
        );
        assert_eq!(
            fx.authorizer
                .can_add_member(&session, alice_org.id, missing_user)
                .await,
            Err(AuthzError::NotFound("user"))
        );
        assert_eq!(
            fx.authorizer
                .can_add_member(&session, orgdesk_core::OrganisationId::new(), alice.id)
                .await,
            Err(AuthzError::NotFound("organisation"))
        );
    }

    #[tokio::test]
    async fn members_see_themselves() {
        let fx = setup();
        let (alice, _) = fx.register("Alice", "alice@example.com").await;
        let session = fx.login(&alice).await;

        let me = fx.authorizer.can_view_user(&session, alice.id).await.unwrap();
        assert_eq!(me.email, "alice@example.com");
    }
}
