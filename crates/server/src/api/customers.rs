use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use omnicall_directory_core::{CreateCustomerRequest, DirectoryEntry};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PhoneQuery {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub success: bool,
    pub customers: Vec<DirectoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<DirectoryEntry>,
}

/// All customers, newest first
pub async fn list(State(state): State<AppState>) -> Result<Json<CustomersResponse>, ApiError> {
    let customers = state
        .store
        .list_customers()
        .await
        .map_err(|e| ApiError::from_store("Failed to get customers", e))?;
    Ok(Json(CustomersResponse {
        success: true,
        customers,
    }))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerResponse>), ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    let customer = state
        .store
        .create_customer(request)
        .await
        .map_err(|e| ApiError::from_store("Failed to create customer", e))?;

    info!("Added customer {} ({})", customer.display_name(), customer.id);
    Ok((
        StatusCode::CREATED,
        Json(CustomerResponse {
            success: true,
            customer: Some(customer),
        }),
    ))
}

/// Resolve a phone number to a customer; a miss is `success: false`, not an error
pub async fn by_phone(
    State(state): State<AppState>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<CustomerResponse>, ApiError> {
    let phone = query
        .phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Phone number is required"))?;

    debug!("Looking up customer by phone {}", phone);
    let customer = state
        .store
        .lookup_by_phone(&phone, &state.matcher)
        .await
        .map_err(|e| ApiError::from_store("Failed to get customer", e))?;

    match &customer {
        Some(c) => debug!("Matched {} to customer {}", phone, c.id),
        None => debug!("No customer for {}", phone),
    }

    Ok(Json(CustomerResponse {
        success: customer.is_some(),
        customer,
    }))
}
