// src/web/handlers/analytics_handlers.rs
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::domain::{stats, today_utc, Stats};
use crate::export::{csv_file_name, pdf_file_name, to_csv};
use crate::web::handlers::application_handlers::query_applications;
use crate::web::types::*;
use crate::web::AppState;

pub async fn stats_handler(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Stats>>> {
    let records = query_applications(state, auth.id(), &query).await?;
    let stats = stats::compute(&records);

    Ok(Json(DataResponse::success(
        format!("Statistics for {} applications", records.len()),
        stats,
    )))
}

pub async fn export_csv_handler(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    let records = query_applications(state, auth.id(), &query).await?;
    let csv = to_csv(&records).map_err(|e| internal_error("export CSV", e))?;

    app_log!(info, "User {} exported {} applications to CSV", auth.email(), records.len());
    Ok(FileResponse::csv(csv, csv_file_name(today_utc())))
}

pub async fn export_pdf_handler(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    let records = query_applications(state, auth.id(), &query).await?;
    let today = today_utc();
    let pdf = state
        .reports
        .render(&records, today)
        .await
        .map_err(|e| internal_error("export PDF", e))?;

    app_log!(info, "User {} exported {} applications to PDF", auth.email(), records.len());
    Ok(FileResponse::pdf(pdf, pdf_file_name(today)))
}
