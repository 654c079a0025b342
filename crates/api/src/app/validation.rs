//! Per-request field rules.
//!
//! Each request type has a fixed table of `{field, check, message}` rules.
//! Every failing rule is reported, in table order.

use serde::Serialize;
use validator::ValidateEmail;

use orgdesk_auth::MIN_PASSWORD_LEN;

use crate::app::dto::{AddMemberRequest, CreateOrganisationRequest, LoginRequest, RegisterRequest};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

pub struct FieldRule<T> {
    pub field: &'static str,
    pub check: fn(&T) -> bool,
    pub message: &'static str,
}

pub fn validate<T>(value: &T, rules: &[FieldRule<T>]) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = rules
        .iter()
        .filter(|rule| !(rule.check)(value))
        .map(|rule| FieldError {
            field: rule.field,
            message: rule.message.to_string(),
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn present(s: &str) -> bool {
    !s.trim().is_empty()
}

fn email(s: &str) -> bool {
    present(s) && s.validate_email()
}

fn name_len(s: &str) -> bool {
    present(s) && (3..=50).contains(&s.chars().count())
}

pub const REGISTER_RULES: &[FieldRule<RegisterRequest>] = &[
    FieldRule {
        field: "email",
        check: |r| email(&r.email),
        message: "Email is required and must be a valid email address",
    },
    FieldRule {
        field: "password",
        check: |r| present(&r.password) && r.password.chars().count() >= MIN_PASSWORD_LEN,
        message: "Password is required and must be at least 6 characters",
    },
    FieldRule {
        field: "firstName",
        check: |r| name_len(&r.first_name),
        message: "First name is required and must be between 3 to 50 characters",
    },
    FieldRule {
        field: "lastName",
        check: |r| name_len(&r.last_name),
        message: "Last name is required and must be between 3 to 50 characters",
    },
];

pub const LOGIN_RULES: &[FieldRule<LoginRequest>] = &[
    FieldRule {
        field: "email",
        check: |r| email(&r.email),
        message: "Email is required and must be a valid email address",
    },
    FieldRule {
        field: "password",
        check: |r| present(&r.password),
        message: "Password is required",
    },
];

pub const CREATE_ORGANISATION_RULES: &[FieldRule<CreateOrganisationRequest>] = &[FieldRule {
    field: "name",
    check: |r| present(&r.name),
    message: "Organization name is required",
}];

pub const ADD_MEMBER_RULES: &[FieldRule<AddMemberRequest>] = &[FieldRule {
    field: "userId",
    check: |r| present(&r.user_id),
    message: "UserID is required",
}];

#[cfg(test)]
mod tests {
    use super::*;

    fn register(first: &str, last: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            password: password.into(),
            phone: None,
        }
    }

    fn fields(errors: Vec<FieldError>) -> Vec<&'static str> {
        errors.into_iter().map(|e| e.field).collect()
    }

    #[test]
    fn valid_registration_passes() {
        let req = register("John", "Doe", "john@x.com", "password123");
        assert_eq!(validate(&req, REGISTER_RULES), Ok(()));
    }

    #[test]
    fn every_failing_rule_is_reported_in_order() {
        let req = register("Jo", "", "not-an-email", "");
        let errs = validate(&req, REGISTER_RULES).unwrap_err();
        assert_eq!(fields(errs), vec!["email", "password", "firstName", "lastName"]);
    }

    #[test]
    fn name_bounds_are_inclusive() {
        let long = "x".repeat(50);
        assert_eq!(validate(&register("Ann", &long, "a@b.co", "secret"), REGISTER_RULES), Ok(()));

        let too_long = "x".repeat(51);
        let errs = validate(&register("Ann", &too_long, "a@b.co", "secret"), REGISTER_RULES)
            .unwrap_err();
        assert_eq!(fields(errs), vec!["lastName"]);
    }

    #[test]
    fn short_password_is_rejected_at_registration() {
        let errs = validate(&register("John", "Doe", "a@b.co", "12345"), REGISTER_RULES)
            .unwrap_err();
        assert_eq!(fields(errs), vec!["password"]);
    }

    #[test]
    fn login_only_requires_presence_of_password() {
        let req = LoginRequest {
            email: "a@b.co".into(),
            password: "x".into(),
        };
        assert_eq!(validate(&req, LOGIN_RULES), Ok(()));
    }

    #[test]
    fn organisation_and_member_messages() {
        let errs = validate(&CreateOrganisationRequest::default(), CREATE_ORGANISATION_RULES)
            .unwrap_err();
        assert_eq!(errs[0].message, "Organization name is required");

        let errs = validate(&AddMemberRequest::default(), ADD_MEMBER_RULES).unwrap_err();
        assert_eq!(errs[0].field, "userId");
        assert_eq!(errs[0].message, "UserID is required");
    }
}
