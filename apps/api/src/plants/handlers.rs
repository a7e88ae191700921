//! Axum route handlers for the Plants API.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::plants::models::{CreatePlantRequest, PlantRow, PlantUpdate};
use crate::plants::synthesis::PlantSynthesizer;
use crate::plants::validation::{ensure_unique_name_on_update, validate_update};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct PlantResponse {
    pub success: bool,
    pub plant: PlantRow,
}

impl PlantResponse {
    fn ok(plant: PlantRow) -> Json<Self> {
        Json(Self {
            success: true,
            plant,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PlantListResponse {
    pub success: bool,
    pub plants: Vec<PlantRow>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadInput(format!("Invalid plant id: {raw}")))
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Plant {id} not found"))
}

/// Unwraps a JSON body, reporting any rejection as a malformed body.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /plants
pub async fn handle_list_plants(
    State(state): State<AppState>,
) -> Result<Json<PlantListResponse>, AppError> {
    let plants = state.store.list_all().await?;
    Ok(Json(PlantListResponse {
        success: true,
        plants,
    }))
}

/// GET /plants/:id
pub async fn handle_get_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantResponse>, AppError> {
    let id = parse_id(&id)?;
    let plant = state.store.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
    Ok(PlantResponse::ok(plant))
}

/// POST /plants
///
/// Validates, canonicalises and enriches the submission, then persists it.
/// AI-derived fields that cannot be generated are stored as null.
pub async fn handle_create_plant(
    State(state): State<AppState>,
    payload: Result<Json<CreatePlantRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PlantResponse>), AppError> {
    let request = json_body(payload)?;

    let plant = PlantSynthesizer::new(&state.generators, state.store.as_ref())
        .create(request)
        .await?;

    info!("Created plant {} with slug {:?}", plant.id, plant.slug);
    Ok((StatusCode::CREATED, PlantResponse::ok(plant)))
}

/// PUT /plants/:id
pub async fn handle_update_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlantUpdate>, JsonRejection>,
) -> Result<Json<PlantResponse>, AppError> {
    let id = parse_id(&id)?;
    let update = validate_update(json_body(payload)?)?;
    ensure_unique_name_on_update(state.store.as_ref(), id, &update).await?;

    let plant = state
        .store
        .update(id, update)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(PlantResponse::ok(plant))
}

/// DELETE /plants/:id
pub async fn handle_delete_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PlantResponse>, AppError> {
    let id = parse_id(&id)?;
    let plant = state.store.delete(id).await?.ok_or_else(|| not_found(id))?;
    Ok(PlantResponse::ok(plant))
}
