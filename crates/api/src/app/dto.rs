use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use orgdesk_core::{Organisation, User};

// -------------------------
// Request DTOs
// -------------------------
//
// Fields default to empty so that a missing field reaches the validation
// table (422) instead of failing deserialization (400).

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrganisationRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub user: UserResponse,
    /// Memberships at sign-in; not part of `UserResponse` so profile reads
    /// never expose another user's organisations.
    pub organisations: Vec<OrganisationResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationResponse {
    pub org_id: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Organisation> for OrganisationResponse {
    fn from(org: &Organisation) -> Self {
        Self {
            org_id: org.id.to_string(),
            name: org.name.clone(),
            description: org.description.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrganisationsResponse {
    pub organisations: Vec<OrganisationResponse>,
}

/// `{"status":"success","message":..,"data":..}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(
    status: StatusCode,
    message: &'static str,
    data: T,
) -> axum::response::Response {
    (
        status,
        axum::Json(ApiResponse {
            status: "success",
            message,
            data: Some(data),
        }),
    )
        .into_response()
}

/// Success envelope without a `data` member.
pub fn success_message(status: StatusCode, message: &'static str) -> axum::response::Response {
    (
        status,
        axum::Json(ApiResponse::<()> {
            status: "success",
            message,
            data: None,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_request_fields_deserialize_as_empty() {
        let req: RegisterRequest = serde_json::from_value(json!({ "email": "a@b.co" })).unwrap();
        assert_eq!(req.email, "a@b.co");
        assert!(req.first_name.is_empty());
        assert!(req.phone.is_none());
    }

    #[test]
    fn responses_use_camel_case() {
        let org = OrganisationResponse {
            org_id: "id".into(),
            name: "Acme".into(),
            description: None,
        };
        let v = serde_json::to_value(&org).unwrap();
        assert_eq!(v["orgId"], "id");

        let auth = AuthResponse {
            access_token: "t".into(),
            user: UserResponse {
                user_id: "u".into(),
                first_name: "John".into(),
                last_name: "Doe".into(),
                email: "john@x.com".into(),
                phone: None,
            },
            organisations: vec![org],
        };
        let v = serde_json::to_value(&auth).unwrap();
        assert_eq!(v["accessToken"], "t");
        assert_eq!(v["user"]["firstName"], "John");
        assert_eq!(v["organisations"][0]["name"], "Acme");
        assert!(v["user"].get("organisations").is_none());
    }
}
