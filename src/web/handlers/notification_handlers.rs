// src/web/handlers/notification_handlers.rs
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::serde::json::Json;
use rocket::{Request, State};

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::domain::{today_utc, weekly_summary};
use crate::notifications::signature::SIGNATURE_HEADER;
use crate::notifications::{
    compose, run_job, EmailContext, EmailType, JobReport, Mailer, NotificationJob,
};
use crate::web::handlers::application_handlers::load_applications;
use crate::web::types::*;
use crate::web::AppState;

/// Raw value of the scheduler signature header, if any.
pub struct SignatureHeader(Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SignatureHeader {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(SignatureHeader(
            req.headers().get_one(SIGNATURE_HEADER).map(str::to_string),
        ))
    }
}

fn unauthorized_trigger(reason: &str) -> ApiError {
    api_error(
        Status::Unauthorized,
        reason,
        "INVALID_SIGNATURE",
        &["Only the scheduler may call this endpoint"],
    )
}

pub async fn test_email_handler(
    request: Json<TestEmailRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    let email_type: EmailType = request.email_type.parse()?;

    let records = load_applications(state, auth.id()).await?;
    let context = match email_type {
        EmailType::WeeklySummary => {
            EmailContext::for_summary(weekly_summary(&records, today_utc()))
        }
        _ => records
            .first()
            .map(EmailContext::for_application)
            .unwrap_or_default(),
    };

    let message = compose(email_type, auth.email(), &context);
    let id = state
        .mailer
        .send(&message)
        .await
        .map_err(|e| internal_error("send test email", e))?;

    app_log!(info, "Sent test {} email to {} ({})", email_type, auth.email(), id);
    Ok(Json(ActionResponse::success(
        format!("Test email sent to {}", auth.email()),
        "send_test_email",
    )))
}

/// Verify the signed trigger and run `job` for every user.
pub async fn cron_handler(
    job: NotificationJob,
    signature: SignatureHeader,
    body: Vec<u8>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<JobReport>>> {
    let Some(signature) = signature.0 else {
        app_log!(warn, "Rejected {} trigger without signature", job);
        return Err(unauthorized_trigger("Missing signature"));
    };

    if let Err(e) = state.verifier.verify(&signature, &body) {
        app_log!(warn, "Rejected {} trigger: {:#}", job, e);
        return Err(unauthorized_trigger("Invalid signature"));
    }

    let report = run_job(job, state.db.pool(), state.mailer.as_ref(), today_utc())
        .await
        .map_err(|e| internal_error(&format!("run {}", job), e))?;

    Ok(Json(DataResponse::success(
        format!("{} emails sent", report.emails_sent),
        report,
    )))
}
