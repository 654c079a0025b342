use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
};

use orgdesk_core::UserId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    // A malformed id cannot name a stored user.
    let Ok(user_id) = id.parse::<UserId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "User not found");
    };

    match services.user_profile(principal.principal(), user_id).await {
        Ok(user) => dto::success(
            StatusCode::OK,
            "User retrieved successfully",
            dto::UserResponse::from(&user),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
