use crate::dtos::{CreateAssetRequest, DeleteAssetRequest};
use crate::error::AssetError;
use crate::models::{Asset, DeleteOutcome};
use crate::startup::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

fn reject_body(rejection: JsonRejection) -> AssetError {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    AssetError::InvalidInput(rejection.body_text())
}

/// `POST /assets`: generate, store and record every item of the batch.
#[tracing::instrument(skip(state, payload))]
pub async fn create_assets(
    State(state): State<AppState>,
    payload: Result<Json<Vec<CreateAssetRequest>>, JsonRejection>,
) -> Result<Json<Vec<Asset>>, AssetError> {
    let Json(requests) = payload.map_err(reject_body)?;

    let assets = state.orchestrator.create_assets(requests).await?;

    Ok(Json(assets))
}

/// `DELETE /assets`: remove the record and the stored image for one code.
#[tracing::instrument(skip(state, payload))]
pub async fn delete_asset(
    State(state): State<AppState>,
    payload: Result<Json<DeleteAssetRequest>, JsonRejection>,
) -> Result<Json<DeleteOutcome>, AssetError> {
    let Json(request) = payload.map_err(reject_body)?;
    request
        .validate()
        .map_err(|e| AssetError::InvalidInput(e.to_string()))?;

    let outcome = state.orchestrator.delete_asset(&request.code).await?;

    Ok(Json(outcome))
}
