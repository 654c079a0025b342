use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use orgdesk_core::{OrganisationId, UserId};

use crate::app::services::AppServices;
use crate::app::validation::{self, ADD_MEMBER_RULES, CREATE_ORGANISATION_RULES};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_organisations).post(create_organisation))
        .route("/:org_id", get(get_organisation))
        .route("/:org_id/users", post(add_member))
}

pub async fn list_organisations(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.organisations(principal.principal()).await {
        Ok(orgs) => dto::success(
            StatusCode::OK,
            "Users organizations retrieved successfully",
            dto::OrganisationsResponse {
                organisations: orgs.iter().map(dto::OrganisationResponse::from).collect(),
            },
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_organisation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(org_id): Path<String>,
) -> axum::response::Response {
    let Ok(org_id) = org_id.parse::<OrganisationId>() else {
        return organisation_not_found();
    };

    match services.organisation(principal.principal(), org_id).await {
        Ok(org) => dto::success(
            StatusCode::OK,
            "Organization retrieved successfully",
            dto::OrganisationResponse::from(&org),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_organisation(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateOrganisationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::bad_body("Client error");
    };
    if let Err(errs) = validation::validate(&body, CREATE_ORGANISATION_RULES) {
        return errors::validation_error(errs);
    }

    let description = body.description.filter(|d| !d.trim().is_empty());
    match services
        .create_organisation(principal.principal(), body.name, description)
        .await
    {
        Ok(org) => dto::success(
            StatusCode::CREATED,
            "Organisation created successfully",
            dto::OrganisationResponse::from(&org),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn add_member(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(org_id): Path<String>,
    body: Result<Json<dto::AddMemberRequest>, JsonRejection>,
) -> axum::response::Response {
    let Ok(org_id) = org_id.parse::<OrganisationId>() else {
        return organisation_not_found();
    };
    let Ok(Json(body)) = body else {
        return errors::bad_body("Client error");
    };
    if let Err(errs) = validation::validate(&body, ADD_MEMBER_RULES) {
        return errors::validation_error(errs);
    }
    let Ok(user_id) = body.user_id.trim().parse::<UserId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "User not found");
    };

    match services.add_member(principal.principal(), org_id, user_id).await {
        Ok(()) => dto::success_message(StatusCode::OK, "User added to organisation successfully"),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn organisation_not_found() -> axum::response::Response {
    errors::json_error(StatusCode::NOT_FOUND, "Organisation not found")
}
