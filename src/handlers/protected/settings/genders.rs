// handlers/protected/settings/genders.rs - /settings/personalization/genders handlers
//
// The `:gender` path segment is bound to a gender of the caller's account
// before anything else happens; a miss answers 404.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, State},
    Json,
};

use crate::database::models::{Deleted, Gender, GenderSummary, GenderTypeOption};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::services::{CreateGenderRequest, UpdateGenderRequest};

/// GET /settings/personalization/genders - Genders of the account with contact counts
pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<GenderSummary>>, ApiError> {
    let ctx = state.account_context(&user);
    Ok(Json(state.genders.list(&ctx).await?))
}

/// GET /settings/personalization/genders/types - Selectable sex types
pub async fn types(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Json<Vec<GenderTypeOption>> {
    let ctx = state.account_context(&user);
    Json(state.genders.types(&ctx))
}

/// POST /settings/personalization/genders - Create a gender
pub async fn store(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateGenderRequest>, JsonRejection>,
) -> Result<Json<GenderSummary>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let ctx = state.account_context(&user);
    Ok(Json(state.genders.create(&ctx, request).await?))
}

/// PUT|PATCH /settings/personalization/genders/:gender - Update name and type
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(gender_id): Path<i64>,
    payload: Result<Json<UpdateGenderRequest>, JsonRejection>,
) -> Result<Json<Gender>, ApiError> {
    let ctx = state.account_context(&user);
    let gender = state.genders.find(&ctx, gender_id).await?;
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    Ok(Json(state.genders.update(&ctx, &gender, request).await?))
}

/// DELETE /settings/personalization/genders/:gender/replaceby/:gender_id
pub async fn destroy_and_replace(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((gender_id, replacement_id)): Path<(i64, i64)>,
) -> Result<Json<Deleted>, ApiError> {
    let ctx = state.account_context(&user);
    let gender = state.genders.find(&ctx, gender_id).await?;

    Ok(Json(
        state
            .genders
            .destroy_and_replace(&ctx, &gender, replacement_id)
            .await?,
    ))
}

/// DELETE /settings/personalization/genders/:gender - Delete without reassigning contacts
pub async fn destroy(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(gender_id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    let ctx = state.account_context(&user);
    let gender = state.genders.find(&ctx, gender_id).await?;

    Ok(Json(state.genders.destroy(&ctx, &gender).await?))
}
