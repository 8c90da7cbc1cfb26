use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use kambaz_db::models::{Module, ModuleKey, ModulePatch, Role};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, auth::SessionUser, auth::require_role, error::ApiError};

/// Create the module routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/courses/{courseId}/modules",
            get(find_modules_for_course).post(create_module),
        )
        .route(
            "/api/courses/modules/{moduleId}",
            put(update_module).delete(delete_module),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ModuleData {
    name: String,
    description: String,
}

async fn find_modules_for_course(
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<Module>>, ApiError> {
    Ok(Json(state.store.modules_for_course(course_id).await?))
}

async fn create_module(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(course_id): Path<Uuid>,
    Json(body): Json<ModuleData>,
) -> Result<Json<Module>, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can create modules",
    )?;

    let module = Module {
        id: Uuid::new_v4(),
        name: body.name,
        description: body.description,
        course: course_id,
    };
    Ok(Json(state.store.create_module(module).await?))
}

/// The `{moduleId}` segment addresses a module by generated id or by name.
async fn update_module(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(module_id): Path<String>,
    Json(patch): Json<ModulePatch>,
) -> Result<Json<Module>, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can update modules",
    )?;

    let module = state
        .store
        .update_module(&ModuleKey::new(module_id), patch)
        .await?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;
    Ok(Json(module))
}

async fn delete_module(
    session: SessionUser,
    State(state): State<ApiState>,
    Path(module_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    require_role(
        &session.user,
        &[Role::Faculty, Role::Admin],
        "Only faculty can delete modules",
    )?;

    if !state.store.delete_module(&ModuleKey::new(module_id)).await? {
        return Err(ApiError::NotFound("Module not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
