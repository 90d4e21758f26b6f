// src/web/handlers/cv_handlers.rs
use chrono::Utc;
use rocket::form::Form;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::State;

use crate::app_log;
use crate::auth::AuthenticatedUser;
use crate::core::FsOps;
use crate::domain::DomainError;
use crate::repository::{CvRecord, CvRepository};
use crate::storage::{validate_cv, MAX_CV_SIZE};
use crate::web::types::*;
use crate::web::AppState;

const FALLBACK_CV_NAME: &str = "cv";

pub async fn upload_cv_handler(
    mut upload: Form<CvUploadForm<'_>>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Custom<Json<DataResponse<CvRecord>>>> {
    if upload.file.len() > MAX_CV_SIZE {
        return Err(DomainError::FileTooLarge {
            max_mb: MAX_CV_SIZE / 1024 / 1024,
        }
        .into());
    }

    let content_type = upload.file.content_type().map(|ct| ct.to_string());
    // Display name only; the stored file is keyed by a generated id.
    let file_name = upload
        .file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_CV_NAME.to_string());

    let temp_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));
    if let Err(e) = upload.file.persist_to(&temp_path).await {
        app_log!(error, "Failed to save uploaded file: {}", e);
        return Err(api_error(
            Status::InternalServerError,
            "Failed to process uploaded file",
            "FILE_SAVE_ERROR",
            &["Try uploading the file again"],
        ));
    }

    let bytes = FsOps::read_file_bytes(&temp_path).await;
    if let Err(e) = FsOps::remove_file(&temp_path).await {
        app_log!(warn, "Failed to remove temp upload {}: {}", temp_path.display(), e);
    }
    let bytes = bytes.map_err(|e| internal_error("read uploaded file", e))?;

    let format = validate_cv(&file_name, content_type.as_deref(), &bytes)?;

    let file_id = state
        .storage
        .save(auth.id(), &bytes)
        .await
        .map_err(|e| internal_error("store CV", e))?;

    let record = CvRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: auth.id().to_string(),
        file_id,
        file_name,
        size_bytes: bytes.len() as i64,
        content_type: format.content_type().to_string(),
        is_favorite: false,
        created_at: Utc::now(),
    };

    if let Err(e) = CvRepository::new(state.db.pool()).insert(&record).await {
        if let Err(cleanup) = state.storage.remove(auth.id(), &record.file_id).await {
            app_log!(warn, "Failed to remove orphaned CV file {}: {}", record.file_id, cleanup);
        }
        return Err(internal_error("save CV", e));
    }

    app_log!(info, "User {} uploaded CV {}", auth.email(), record.file_name);
    Ok(Custom(
        Status::Created,
        Json(DataResponse::success("CV uploaded", record)),
    ))
}

pub async fn list_cvs_handler(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Vec<CvRecord>>>> {
    let cvs = CvRepository::new(state.db.pool())
        .list_for_user(auth.id())
        .await
        .map_err(|e| internal_error("list CVs", e))?;

    Ok(Json(DataResponse::success(format!("{} CVs", cvs.len()), cvs)))
}

pub async fn favorite_cv_handler(
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<DataResponse<Option<CvRecord>>>> {
    let favorite = CvRepository::new(state.db.pool())
        .favorite(auth.id())
        .await
        .map_err(|e| internal_error("load favorite CV", e))?;

    let message = if favorite.is_some() {
        "Favorite CV"
    } else {
        "No favorite CV"
    };
    Ok(Json(DataResponse::success(message, favorite)))
}

pub async fn download_cv_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<FileResponse> {
    let cv = CvRepository::new(state.db.pool())
        .find(auth.id(), id)
        .await
        .map_err(|e| internal_error("load CV", e))?
        .ok_or_else(|| not_found("CV"))?;

    let bytes = state
        .storage
        .read(auth.id(), &cv.file_id)
        .await
        .map_err(|e| internal_error("read CV file", e))?;

    Ok(FileResponse::with_content_type(
        bytes,
        &cv.content_type,
        cv.file_name,
    ))
}

pub async fn rename_cv_handler(
    id: &str,
    request: Json<RenameCvRequest>,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    let file_name = request.file_name.trim();
    if file_name.is_empty() {
        return Err(DomainError::MissingField("file_name").into());
    }

    let renamed = CvRepository::new(state.db.pool())
        .rename(auth.id(), id, file_name)
        .await
        .map_err(|e| internal_error("rename CV", e))?;

    if !renamed {
        return Err(not_found("CV"));
    }
    Ok(Json(ActionResponse::success(
        format!("CV renamed to {}", file_name),
        "rename_cv",
    )))
}

pub async fn set_favorite_cv_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    let updated = CvRepository::new(state.db.pool())
        .set_favorite(auth.id(), id)
        .await
        .map_err(|e| internal_error("set favorite CV", e))?;

    if !updated {
        return Err(not_found("CV"));
    }
    Ok(Json(ActionResponse::success("Favorite CV updated", "set_favorite_cv")))
}

pub async fn delete_cv_handler(
    id: &str,
    auth: AuthenticatedUser,
    state: &State<AppState>,
) -> ApiResult<Json<ActionResponse>> {
    let cv = CvRepository::new(state.db.pool())
        .delete(auth.id(), id)
        .await
        .map_err(|e| internal_error("delete CV", e))?
        .ok_or_else(|| not_found("CV"))?;

    if let Err(e) = state.storage.remove(auth.id(), &cv.file_id).await {
        app_log!(warn, "CV {} deleted but its file remains: {:#}", cv.id, e);
    }

    app_log!(info, "User {} deleted CV {}", auth.email(), cv.file_name);
    Ok(Json(ActionResponse::success("CV deleted", "delete_cv")))
}
