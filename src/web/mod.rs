// src/web/mod.rs
pub mod handlers;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, patch, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;

use crate::app_log;
use crate::auth::{AuthConfig, AuthenticatedUser, LoginRequest, OptionalAuth, RegisterRequest};
use crate::core::{ConfigManager, Database};
use crate::domain::{Application, CreateApplicationInput, QuickAddInput, Stats, UpdateApplicationInput};
use crate::export::ReportGenerator;
use crate::link_parser::{LinkParser, ParsedJobLink};
use crate::notifications::scheduler::spawn_scheduler;
use crate::notifications::{mailer_from_settings, JobReport, Mailer, NotificationJob, SignatureVerifier};
use crate::repository::{CvRecord, User};
use crate::storage::CvStorage;
use handlers::SignatureHeader;

/// Everything a request handler needs, managed by Rocket.
pub struct AppState {
    pub db: Database,
    pub config: ConfigManager,
    pub auth: AuthConfig,
    pub storage: CvStorage,
    pub reports: ReportGenerator,
    pub mailer: Arc<dyn Mailer>,
    pub verifier: SignatureVerifier,
    pub link_parser: LinkParser,
}

impl AppState {
    pub fn from_parts(config: ConfigManager, db: Database, mailer: Arc<dyn Mailer>) -> Result<Self> {
        Ok(Self {
            auth: AuthConfig::new(&config.auth),
            storage: CvStorage::new(&config.environment.data_path),
            reports: ReportGenerator::new(config.environment.reports_path.clone()),
            verifier: SignatureVerifier::new(&config.scheduler),
            link_parser: LinkParser::new()?,
            mailer,
            db,
            config,
        })
    }
}

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PATCH, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Auth

#[post("/auth/register", data = "<request>")]
pub async fn register(
    request: Json<RegisterRequest>,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<AuthPayload>>>> {
    handlers::register_handler(request, state).await
}

#[post("/auth/login", data = "<request>")]
pub async fn login(
    request: Json<LoginRequest>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<AuthPayload>>> {
    handlers::login_handler(request, state).await
}

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<User>> {
    handlers::get_current_user_handler(auth).await
}

#[get("/health")]
pub async fn health(auth: OptionalAuth, state: &State<AppState>) -> Json<HealthStatus> {
    handlers::health_handler(auth, state).await
}

// Applications

#[get("/applications?<query..>")]
pub async fn list_applications(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ApplicationList>>> {
    handlers::list_applications_handler(query, auth, state).await
}

#[get("/applications/interviews/today")]
pub async fn upcoming_interviews(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<UpcomingInterviews>>> {
    handlers::upcoming_interviews_handler(auth, state).await
}

#[get("/applications/<id>")]
pub async fn get_application(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    handlers::get_application_handler(id, auth, state).await
}

#[post("/applications", data = "<request>")]
pub async fn create_application(
    request: Json<CreateApplicationInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<Application>>>> {
    handlers::create_application_handler(request, auth, state).await
}

#[post("/applications/quick", data = "<request>")]
pub async fn quick_add_application(
    request: Json<QuickAddInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<Application>>>> {
    handlers::quick_add_handler(request, auth, state).await
}

#[patch("/applications/<id>", data = "<request>")]
pub async fn update_application(
    id: &str,
    request: Json<UpdateApplicationInput>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    handlers::update_application_handler(id, request, auth, state).await
}

#[delete("/applications/<id>")]
pub async fn delete_application(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::delete_application_handler(id, auth, state).await
}

#[post("/applications/<id>/favorite")]
pub async fn toggle_favorite(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Application>>> {
    handlers::toggle_favorite_handler(id, auth, state).await
}

// Analytics and exports

#[get("/stats?<query..>")]
pub async fn stats(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Stats>>> {
    handlers::stats_handler(query, auth, state).await
}

#[get("/export/csv?<query..>")]
pub async fn export_csv(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    handlers::export_csv_handler(query, auth, state).await
}

#[get("/export/pdf?<query..>")]
pub async fn export_pdf(
    query: ApplicationQuery,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    handlers::export_pdf_handler(query, auth, state).await
}

// CVs

#[get("/cvs")]
pub async fn list_cvs(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<CvRecord>>>> {
    handlers::list_cvs_handler(auth, state).await
}

#[post("/cvs", data = "<upload>")]
pub async fn upload_cv(
    upload: Form<CvUploadForm<'_>>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<CvRecord>>>> {
    handlers::upload_cv_handler(upload, auth, state).await
}

#[get("/cvs/favorite")]
pub async fn favorite_cv(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Option<CvRecord>>>> {
    handlers::favorite_cv_handler(auth, state).await
}

#[get("/cvs/<id>/download")]
pub async fn download_cv(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    handlers::download_cv_handler(id, auth, state).await
}

#[patch("/cvs/<id>", data = "<request>")]
pub async fn rename_cv(
    id: &str,
    request: Json<RenameCvRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::rename_cv_handler(id, request, auth, state).await
}

#[post("/cvs/<id>/favorite")]
pub async fn set_favorite_cv(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::set_favorite_cv_handler(id, auth, state).await
}

#[delete("/cvs/<id>")]
pub async fn delete_cv(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::delete_cv_handler(id, auth, state).await
}

// Link parsing and notifications

#[post("/parse-link", data = "<request>")]
pub async fn parse_link(
    request: Json<ParseLinkRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<ParsedJobLink>>> {
    handlers::parse_link_handler(request, auth, state).await
}

#[post("/notifications/test", data = "<request>")]
pub async fn test_email(
    request: Json<TestEmailRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    handlers::test_email_handler(request, auth, state).await
}

#[post("/cron/check-interviews", data = "<body>")]
pub async fn cron_check_interviews(
    signature: SignatureHeader,
    body: Vec<u8>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<JobReport>>> {
    handlers::cron_handler(NotificationJob::CheckInterviews, signature, body, state).await
}

#[post("/cron/check-no-response", data = "<body>")]
pub async fn cron_check_no_response(
    signature: SignatureHeader,
    body: Vec<u8>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<JobReport>>> {
    handlers::cron_handler(NotificationJob::CheckNoResponse, signature, body, state).await
}

#[post("/cron/weekly-summary", data = "<body>")]
pub async fn cron_weekly_summary(
    signature: SignatureHeader,
    body: Vec<u8>,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<JobReport>>> {
    handlers::cron_handler(NotificationJob::WeeklySummary, signature, body, state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "UNAUTHORIZED".to_string(),
        vec!["Log in and send the token as a Bearer Authorization header".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found_catcher() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the URL".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "INVALID_BODY".to_string(),
        vec![
            "Check field names and value types".to_string(),
            "Dates use YYYY-MM-DD".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error_catcher() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the Rocket instance around `state`.
pub fn build_rocket(state: AppState) -> Rocket<Build> {
    // Above MAX_CV_SIZE: oversized uploads must reach the validator.
    let limits = Limits::default()
        .limit("file", 12.mebibytes())
        .limit("data-form", 12.mebibytes());
    let figment = rocket::Config::figment().merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![
                bad_request,
                unauthorized,
                not_found_catcher,
                unprocessable,
                internal_error_catcher
            ],
        )
        .mount(
            "/api",
            routes![
                register,
                login,
                get_current_user,
                health,
                list_applications,
                upcoming_interviews,
                get_application,
                create_application,
                quick_add_application,
                update_application,
                delete_application,
                toggle_favorite,
                stats,
                export_csv,
                export_pdf,
                list_cvs,
                upload_cv,
                favorite_cv,
                download_cv,
                rename_cv,
                set_favorite_cv,
                delete_cv,
                parse_link,
                test_email,
                cron_check_interviews,
                cron_check_no_response,
                cron_weekly_summary,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: ConfigManager) -> Result<()> {
    config.ensure_directories().await?;

    let db = Database::new(&config.environment.database_path).await?;
    let mailer = mailer_from_settings(&config.mail)?;

    if config.scheduler.enabled {
        spawn_scheduler(db.pool().clone(), mailer.clone());
    } else {
        app_log!(info, "In-process scheduler disabled, relying on signed cron triggers");
    }

    app_log!(info, "Starting Joblyst API server");
    app_log!(info, "Data: {}", config.environment.data_path.display());
    app_log!(info, "Database: {}", config.environment.database_path.display());

    let state = AppState::from_parts(config, db, mailer)?;
    build_rocket(state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket server failed: {}", e))?;

    Ok(())
}
