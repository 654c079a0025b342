use orgdesk_auth::Principal;

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; present on every route under `/api`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: Principal,
}

impl PrincipalContext {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }
}
