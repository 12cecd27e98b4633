//! # Providers API Handlers
//!
//! CRUD endpoints for waiting-room providers. Input is validated and defaulted
//! here, before anything reaches storage.

use crate::error::{ApiError, not_found, validation_error};
use crate::models::provider::{self, MAX_WAIT_TIME, MIN_WAIT_TIME};
use crate::repositories::{NewProvider, ProviderRepository};
use crate::server::AppState;
use axum::{
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, header},
    response::Json,
};
use migration::NAME_MAX_LEN;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Provider as returned by every endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    /// Server-assigned identifier
    #[schema(example = 1)]
    pub id: i32,
    /// Display name of the provider
    #[schema(example = "Dr. Johnson")]
    pub name: String,
    /// Expected wait in minutes (0-480)
    #[schema(example = 15, minimum = 0, maximum = 480)]
    pub wait_time: i16,
    /// Whether the provider is shown to end users
    pub visible: bool,
    /// Whether the wait time is displayed
    pub show_wait_time: bool,
}

impl From<provider::Model> for ProviderResponse {
    fn from(model: provider::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            wait_time: model.wait_time,
            visible: model.visible,
            show_wait_time: model.show_wait_time,
        }
    }
}

/// Request payload for creating a provider
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProviderRequest {
    /// Display name (at most 255 characters)
    #[schema(example = "Dr. Chen")]
    pub name: String,
    /// Expected wait in minutes (0-480)
    #[schema(example = 20, minimum = 0, maximum = 480)]
    pub wait_time: i64,
    /// Defaults to true
    pub visible: Option<bool>,
    /// Defaults to true
    pub show_wait_time: Option<bool>,
}

impl CreateProviderRequest {
    /// Validates the payload and applies the documented defaults.
    pub fn validate(self) -> Result<NewProvider, ApiError> {
        let wait_time = validate_fields(&self.name, self.wait_time)?;

        Ok(NewProvider {
            name: self.name,
            wait_time,
            visible: self.visible.unwrap_or(true),
            show_wait_time: self.show_wait_time.unwrap_or(true),
        })
    }
}

/// Request payload for replacing a provider; every field is required
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProviderRequest {
    /// Display name (at most 255 characters)
    #[schema(example = "Dr. Chen")]
    pub name: String,
    /// Expected wait in minutes (0-480)
    #[schema(example = 45, minimum = 0, maximum = 480)]
    pub wait_time: i64,
    pub visible: bool,
    pub show_wait_time: bool,
}

impl UpdateProviderRequest {
    /// Validates the payload.
    pub fn validate(self) -> Result<NewProvider, ApiError> {
        let wait_time = validate_fields(&self.name, self.wait_time)?;

        Ok(NewProvider {
            name: self.name,
            wait_time,
            visible: self.visible,
            show_wait_time: self.show_wait_time,
        })
    }
}

/// Confirmation returned after a delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteProviderResponse {
    #[schema(example = "Provider deleted successfully")]
    pub message: String,
}

fn validate_fields(name: &str, wait_time: i64) -> Result<i16, ApiError> {
    let name_len = name.chars().count();
    if name_len > NAME_MAX_LEN as usize {
        return Err(validation_error(
            "Provider name exceeds maximum length",
            json!({
                "field": "name",
                "max_length": NAME_MAX_LEN,
                "actual_length": name_len
            }),
        ));
    }

    match i16::try_from(wait_time) {
        Ok(minutes) if (MIN_WAIT_TIME..=MAX_WAIT_TIME).contains(&minutes) => Ok(minutes),
        _ => Err(validation_error(
            "wait_time must be between 0 and 480 minutes",
            json!({
                "field": "wait_time",
                "minimum": MIN_WAIT_TIME,
                "maximum": MAX_WAIT_TIME,
                "actual": wait_time
            }),
        )),
    }
}

fn provider_not_found(id: i64) -> ApiError {
    not_found("Provider not found").with_details(json!({ "provider_id": id }))
}

/// Narrows a path id to the column type. Integers no row can carry are
/// reported as missing rather than malformed.
fn stored_id(id: i64) -> Result<i32, ApiError> {
    i32::try_from(id).map_err(|_| provider_not_found(id))
}

/// List every provider
#[utoipa::path(
    get,
    path = "/api/providers",
    responses(
        (status = 200, description = "All providers, in storage order", body = [ProviderResponse]),
        (status = 500, description = "Internal server error", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProviderResponse>>, ApiError> {
    let providers = ProviderRepository::new(&state.db).list_all().await?;

    Ok(Json(providers.into_iter().map(Into::into).collect()))
}

/// Get a single provider
#[utoipa::path(
    get,
    path = "/api/providers/{id}",
    params(
        ("id" = i64, Path, description = "Provider id")
    ),
    responses(
        (status = 200, description = "The provider", body = ProviderResponse),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "Provider not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn get_provider(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<ProviderResponse>, ApiError> {
    let Path(id) = path?;

    let provider = ProviderRepository::new(&state.db)
        .find_by_id(stored_id(id)?)
        .await?
        .ok_or_else(|| provider_not_found(id))?;

    Ok(Json(provider.into()))
}

/// Create a provider
#[utoipa::path(
    post,
    path = "/api/providers",
    request_body = CreateProviderRequest,
    responses(
        (status = 201, description = "Provider created", body = ProviderResponse, headers(
            ("Location", description = "URL of the created provider")
        )),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn create_provider(
    State(state): State<AppState>,
    payload: Result<Json<CreateProviderRequest>, JsonRejection>,
) -> Result<
    (
        StatusCode,
        [(header::HeaderName, String); 1],
        Json<ProviderResponse>,
    ),
    ApiError,
> {
    let Json(request) = payload?;
    let input = request.validate()?;

    let created = ProviderRepository::new(&state.db).create(input).await?;
    tracing::info!(provider_id = created.id, "Provider created");

    let location = format!("/api/providers/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created.into()),
    ))
}

/// Replace a provider's fields
#[utoipa::path(
    put,
    path = "/api/providers/{id}",
    params(
        ("id" = i64, Path, description = "Provider id")
    ),
    request_body = UpdateProviderRequest,
    responses(
        (status = 200, description = "Provider updated", body = ProviderResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "Provider not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn update_provider(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateProviderRequest>, JsonRejection>,
) -> Result<Json<ProviderResponse>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let input = request.validate()?;

    let updated = ProviderRepository::new(&state.db)
        .replace(stored_id(id)?, input)
        .await?
        .ok_or_else(|| provider_not_found(id))?;
    tracing::info!(provider_id = id, "Provider updated");

    Ok(Json(updated.into()))
}

/// Delete a provider
#[utoipa::path(
    delete,
    path = "/api/providers/{id}",
    params(
        ("id" = i64, Path, description = "Provider id")
    ),
    responses(
        (status = 200, description = "Provider deleted", body = DeleteProviderResponse),
        (status = 400, description = "Invalid id", body = ApiError),
        (status = 404, description = "Provider not found", body = ApiError),
        (status = 500, description = "Internal server error", body = ApiError),
        (status = 503, description = "Database unavailable", body = ApiError)
    ),
    tag = "providers"
)]
pub async fn delete_provider(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteProviderResponse>, ApiError> {
    let Path(id) = path?;

    if !ProviderRepository::new(&state.db)
        .delete(stored_id(id)?)
        .await?
    {
        return Err(provider_not_found(id));
    }
    tracing::info!(provider_id = id, "Provider deleted");

    Ok(Json(DeleteProviderResponse {
        message: "Provider deleted successfully".to_string(),
    }))
}
