// src/web/handlers/system_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::{AuthenticatedUser, OptionalAuth};
use crate::link_parser::{validate_url, ParsedJobLink};
use crate::repository::User;
use crate::web::types::*;
use crate::web::AppState;

pub async fn get_current_user_handler(auth: AuthenticatedUser) -> Json<DataResponse<User>> {
    Json(DataResponse::success(
        format!("Authenticated as {}", auth.email()),
        auth.user,
    ))
}

pub async fn health_handler(auth: OptionalAuth, state: &State<AppState>) -> Json<HealthStatus> {
    if let Some(user) = auth.user {
        app_log!(debug, "Health check by authenticated user: {}", user.email());
    } else {
        app_log!(debug, "Health check by anonymous user");
    }

    let database = match state.db.health_check().await {
        Ok(()) => true,
        Err(e) => {
            app_log!(error, "{:#}", e);
            false
        }
    };

    Json(HealthStatus {
        status: if database { "ok" } else { "degraded" },
        database,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn parse_link_handler(
    request: Json<ParseLinkRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ParsedJobLink>>> {
    let url = validate_url(&request.url)?;
    app_log!(info, "User {} parsing job link {}", auth.email(), url);

    let parsed = state
        .link_parser
        .parse(&url)
        .await
        .map_err(|e| {
            app_log!(warn, "Failed to parse job link {}: {:#}", url, e);
            api_error(
                Status::BadGateway,
                "Could not read the job posting",
                "LINK_FETCH_FAILED",
                &["Check that the posting is public", "Fill in the details manually"],
            )
        })?;

    Ok(Json(DataResponse::success("Job link parsed", parsed)))
}
