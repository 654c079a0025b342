use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    Json,
};

use crate::app::services::{AppServices, Registration, Session};
use crate::app::validation::{self, LOGIN_RULES, REGISTER_RULES};
use crate::app::{dto, errors};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::bad_body("Registration unsuccessful");
    };
    if let Err(errs) = validation::validate(&body, REGISTER_RULES) {
        return errors::validation_error(errs);
    }

    let registration = Registration {
        first_name: body.first_name,
        last_name: body.last_name,
        email: body.email,
        password: body.password,
        phone: body.phone.filter(|p| !p.trim().is_empty()),
    };

    match services.register(registration).await {
        Ok(session) => dto::success(
            StatusCode::CREATED,
            "Registration successful",
            auth_response(session),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Ok(Json(body)) = body else {
        return errors::bad_body("Client error");
    };
    if let Err(errs) = validation::validate(&body, LOGIN_RULES) {
        return errors::validation_error(errs);
    }

    match services.login(&body.email, &body.password).await {
        Ok(session) => dto::success(StatusCode::OK, "Login successful", auth_response(session)),
        Err(e) => errors::service_error_to_response(e),
    }
}

fn auth_response(session: Session) -> dto::AuthResponse {
    dto::AuthResponse {
        user: dto::UserResponse::from(&session.user),
        organisations: session
            .user
            .organisations
            .iter()
            .map(dto::OrganisationResponse::from)
            .collect(),
        access_token: session.access_token,
    }
}
