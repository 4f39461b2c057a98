use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::auth::AdminGuard;
use crate::dto::{
    AdminAuthRequest, CreateLectureRequest, CreateSubjectRequest, LectureDto, QuestionDto,
    SubjectDto, UploadQuestionsRequest,
};
use crate::error::{CatalogError, Result};
use crate::metrics::CatalogMetrics;
use crate::state::AppState;

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<SubjectDto>>> {
    Ok(Json(state.service.list_subjects().await?))
}

pub async fn list_lectures(State(state): State<AppState>) -> Result<Json<Vec<LectureDto>>> {
    Ok(Json(state.service.list_lectures().await?))
}

pub async fn list_questions_by_lecture(
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> Result<Json<Vec<QuestionDto>>> {
    Ok(Json(
        state.service.list_questions_by_lecture(lecture_id).await?,
    ))
}

pub async fn upload_questions(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UploadQuestionsRequest>, JsonRejection>,
) -> Result<String> {
    let Json(request) = payload?;
    let inserted = state.service.upload_questions(request).await?;
    Ok(format!("{inserted} questions uploaded successfully."))
}

pub async fn admin_auth(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AdminAuthRequest>, JsonRejection>,
) -> Result<(StatusCode, &'static str)> {
    let Json(request) = payload?;
    if state.admin_secret.verify(request.password.as_deref()) {
        Ok((StatusCode::OK, "Authenticated"))
    } else {
        CatalogMetrics::record_admin_rejected();
        Err(CatalogError::Unauthorized)
    }
}

pub async fn admin_list_questions(
    _admin: AdminGuard,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuestionDto>>> {
    Ok(Json(state.service.list_all_questions().await?))
}

pub async fn admin_delete_question(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(question_id): Path<i64>,
) -> Result<&'static str> {
    state.service.delete_question(question_id).await?;
    Ok("Question deleted.")
}

pub async fn admin_create_lecture(
    _admin: AdminGuard,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateLectureRequest>, JsonRejection>,
) -> Result<Json<LectureDto>> {
    let Json(request) = payload?;
    Ok(Json(state.service.create_lecture(request).await?))
}

pub async fn admin_delete_lecture(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(lecture_id): Path<i64>,
) -> Result<&'static str> {
    state.service.delete_lecture(lecture_id).await?;
    Ok("Lecture deleted.")
}

pub async fn admin_create_subject(
    _admin: AdminGuard,
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateSubjectRequest>, JsonRejection>,
) -> Result<Json<SubjectDto>> {
    let Json(request) = payload?;
    Ok(Json(state.service.create_subject(request).await?))
}

pub async fn admin_delete_subject(
    _admin: AdminGuard,
    State(state): State<AppState>,
    Path(subject_id): Path<i64>,
) -> Result<&'static str> {
    state.service.delete_subject(subject_id).await?;
    Ok("Subject deleted.")
}
