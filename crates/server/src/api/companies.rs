use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use omnicall_directory_core::{Company, Error as DirectoryError};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCompany {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub success: bool,
    pub companies: Vec<Company>,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub success: bool,
    pub company: Company,
}

/// List companies, creating the default one on first use
pub async fn list(State(state): State<AppState>) -> Result<Json<CompaniesResponse>, ApiError> {
    let companies = state
        .store
        .ensure_default_company()
        .await
        .map_err(|e| ApiError::from_store("Failed to get companies", e))?;
    Ok(Json(CompaniesResponse {
        success: true,
        companies,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateCompany>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyResponse>), ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request("Company name is required"));
    }

    let company = state.store.create_company(&request.name).await.map_err(|e| match e {
        DirectoryError::AlreadyExists { .. } => ApiError::bad_request("Company with this name already exists"),
        other => ApiError::from_store("Failed to create company", other),
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CompanyResponse {
            success: true,
            company,
        }),
    ))
}
