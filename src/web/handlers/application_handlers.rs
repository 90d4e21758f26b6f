// src/web/handlers/application_handlers.rs
use chrono::Utc;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::domain::{
    apply_filters, current_month, days_until_interview, filter_by_month, is_interview_soon,
    is_interview_today, today_utc, Application, ApplicationStatus, CreateApplicationInput,
    QuickAddInput, UpdateApplicationInput,
};
use crate::notifications::{compose, EmailContext, EmailType, Mailer};
use crate::repository::{ApplicationRepository, CvRepository};
use crate::web::types::*;
use crate::web::AppState;

pub(crate) async fn load_applications(
    state: &AppState,
    user_id: &str,
) -> ApiResult<Vec<Application>> {
    ApplicationRepository::new(state.db.pool())
        .list_for_user(user_id)
        .await
        .map_err(|e| internal_error("load applications", e))
}

/// The caller's records narrowed by the query: month first when given, then the filters.
pub(crate) async fn query_applications(
    state: &AppState,
    user_id: &str,
    query: &ApplicationQuery,
) -> ApiResult<Vec<Application>> {
    let criteria = query.criteria()?;
    let records = load_applications(state, user_id).await?;

    let records = match query.month() {
        Some(month) => filter_by_month(&records, month)?,
        None => records,
    };

    Ok(apply_filters(&records, &criteria))
}

async fn ensure_cv_owned(state: &AppState, user_id: &str, cv_id: &str) -> ApiResult<()> {
    let cv = CvRepository::new(state.db.pool())
        .find(user_id, cv_id)
        .await
        .map_err(|e| internal_error("load CV", e))?;

    match cv {
        Some(_) => Ok(()),
        None => Err(api_error(
            Status::BadRequest,
            "Linked CV does not exist",
            "INVALID_CV",
            &["Upload the CV first or leave cv_id empty"],
        )),
    }
}

async fn insert_application(
    state: &AppState,
    auth: &AuthenticatedUser,
    input: CreateApplicationInput,
) -> ApiResult<Custom<Json<DataResponse<Application>>>> {
    input.validate()?;
    if let Some(cv_id) = input.cv_id.as_deref().filter(|id| !id.trim().is_empty()) {
        ensure_cv_owned(state, auth.id(), cv_id).await?;
    }

    let application = input.into_application(auth.id(), Utc::now());
    ApplicationRepository::new(state.db.pool())
        .insert(&application)
        .await
        .map_err(|e| internal_error("create application", e))?;

    app_log!(
        info,
        "User {} added application {} at {}",
        auth.email(),
        application.id,
        application.company
    );

    Ok(Custom(
        Status::Created,
        Json(DataResponse::success("Application created", application)),
    ))
}

pub async fn list_applications_handler(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ApplicationList>>> {
    let criteria = query.criteria()?;
    let month = query
        .month()
        .map(str::to_string)
        .unwrap_or_else(|| current_month(today_utc()));

    let records = load_applications(state, auth.id()).await?;
    let in_month = filter_by_month(&records, &month)?;
    let items = apply_filters(&in_month, &criteria);

    app_log!(
        debug,
        "Listing {} of {} applications for {} in {}",
        items.len(),
        in_month.len(),
        auth.email(),
        month
    );

    Ok(Json(DataResponse::success(
        format!("{} applications", items.len()),
        ApplicationList {
            month,
            month_count: in_month.len(),
            items,
        },
    )))
}

pub async fn get_application_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    let application = ApplicationRepository::new(state.db.pool())
        .find(auth.id(), id)
        .await
        .map_err(|e| internal_error("load application", e))?
        .ok_or_else(|| not_found("Application"))?;

    Ok(Json(DataResponse::success("Application loaded", application)))
}

pub async fn create_application_handler(
    request: Json<CreateApplicationInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<Application>>>> {
    insert_application(state, &auth, request.into_inner()).await
}

pub async fn quick_add_handler(
    request: Json<QuickAddInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<Application>>>> {
    let input = request.into_inner().into_create_input(today_utc());
    insert_application(state, &auth, input).await
}

pub async fn update_application_handler(
    id: &str,
    request: Json<UpdateApplicationInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    let repo = ApplicationRepository::new(state.db.pool());
    let mut application = repo
        .find(auth.id(), id)
        .await
        .map_err(|e| internal_error("load application", e))?
        .ok_or_else(|| not_found("Application"))?;

    let patch = request.into_inner();
    if let Some(cv_id) = patch.cv_id_to_check() {
        ensure_cv_owned(state, auth.id(), cv_id).await?;
    }

    let previous_status = application.status;
    patch.apply_to(&mut application, Utc::now())?;

    let updated = repo
        .update(&application)
        .await
        .map_err(|e| internal_error("update application", e))?;
    if !updated {
        return Err(not_found("Application"));
    }

    if previous_status != ApplicationStatus::Offer && application.status == ApplicationStatus::Offer
    {
        let message = compose(
            EmailType::NewOffer,
            auth.email(),
            &EmailContext::for_application(&application),
        );
        if let Err(e) = state.mailer.send(&message).await {
            app_log!(warn, "Failed to send offer email to {}: {:#}", auth.email(), e);
        }
    }

    Ok(Json(DataResponse::success("Application updated", application)))
}

pub async fn delete_application_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    let deleted = ApplicationRepository::new(state.db.pool())
        .delete(auth.id(), id)
        .await
        .map_err(|e| internal_error("delete application", e))?;

    if !deleted {
        return Err(not_found("Application"));
    }

    app_log!(info, "User {} deleted application {}", auth.email(), id);
    Ok(Json(ActionResponse::success("Application deleted", "delete_application")))
}

pub async fn toggle_favorite_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    let application = ApplicationRepository::new(state.db.pool())
        .toggle_favorite(auth.id(), id)
        .await
        .map_err(|e| internal_error("toggle favorite", e))?
        .ok_or_else(|| not_found("Application"))?;

    let message = if application.is_favorite {
        "Added to favorites"
    } else {
        "Removed from favorites"
    };
    Ok(Json(DataResponse::success(message, application)))
}

pub async fn upcoming_interviews_handler(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<UpcomingInterviews>>> {
    let today = today_utc();
    let records = load_applications(state, auth.id()).await?;

    let todays: Vec<Application> = records
        .iter()
        .filter(|a| is_interview_today(a.interview_date, today))
        .cloned()
        .collect();

    let mut soon: Vec<Application> = records
        .into_iter()
        .filter(|a| {
            is_interview_soon(a.interview_date, today) && !is_interview_today(a.interview_date, today)
        })
        .collect();
    soon.sort_by_key(|a| days_until_interview(a.interview_date, today));

    Ok(Json(DataResponse::success(
        format!("{} interviews today", todays.len()),
        UpcomingInterviews {
            today: todays,
            soon,
        },
    )))
}
