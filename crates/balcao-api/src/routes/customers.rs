use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use balcao_persist::{CustomerInput, Record};
use crate::{
    error::{ApiError, ApiResult},
    extract::{json_body, lenient_string},
    normalize::log_sql_error,
    state::AppState,
};

const UPSERT_SUGGESTION: &str = "Verifique os dados enviados e tente novamente";

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpsertCustomerRequest {
    /// Phone number, the customer key (up to 20 chars)
    #[serde(default, deserialize_with = "lenient_string")]
    pub celular: Option<String>,
    /// Up to 200 chars
    #[serde(default, deserialize_with = "lenient_string")]
    pub nome: Option<String>,
    /// Up to 50 chars
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpsertCustomerResponse {
    pub message: &'static str,
    pub data: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct ListCustomersResponse {
    pub data: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct CustomerLookupResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Record>,
}

/// Create or update a customer
#[utoipa::path(
    post,
    path = "/clientes",
    request_body = UpsertCustomerRequest,
    responses(
        (status = 200, description = "Customer created or updated"),
        (status = 400, description = "Missing phone or procedure failure")
    ),
    tag = "clientes"
)]
pub async fn upsert_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UpsertCustomerResponse>> {
    let req: UpsertCustomerRequest = json_body(&headers, &body)?;

    let Some(phone) = req.celular else {
        return Err(ApiError::bad_request("Campo 'celular' é obrigatório")
            .suggestion("Verifique: celular (até 20 chars), nome (até 200 chars), email (até 50 chars)"));
    };

    let input = CustomerInput {
        phone,
        name: req.nome.unwrap_or_default(),
        email: req.email.unwrap_or_default(),
    };

    let rows = state.customers.upsert(&input).await.map_err(|e| {
        ApiError::bad_request("Erro ao processar a requisição")
            .details(log_sql_error(&e), state.expose_details())
            .suggestion(UPSERT_SUGGESTION)
    })?;

    Ok(Json(UpsertCustomerResponse {
        message: "Cliente criado/atualizado com sucesso!",
        data: rows,
    }))
}

/// List all customers ordered by name
#[utoipa::path(
    get,
    path = "/clientes",
    responses(
        (status = 200, description = "All customers"),
        (status = 500, description = "Query failure")
    ),
    tag = "clientes"
)]
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListCustomersResponse>> {
    let rows = state.customers.list().await.map_err(|e| {
        ApiError::internal("Erro ao listar clientes")
            .details(log_sql_error(&e), state.expose_details())
            .suggestion("Tente novamente mais tarde")
    })?;

    Ok(Json(ListCustomersResponse { data: rows }))
}

/// Get a customer by phone
///
/// An unknown phone is still a 200, with a not-registered message and no data.
#[utoipa::path(
    get,
    path = "/cliente/{celular}",
    params(
        ("celular" = String, Path, description = "Customer phone")
    ),
    responses(
        (status = 200, description = "Lookup result, with data when found"),
        (status = 400, description = "Procedure failure")
    ),
    tag = "clientes"
)]
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(celular): Path<String>,
) -> ApiResult<Json<CustomerLookupResponse>> {
    let found = state.customers.find_by_phone(&celular).await.map_err(|e| {
        ApiError::bad_request("Erro na busca").details(log_sql_error(&e), state.expose_details())
    })?;

    let Some(customer) = found else {
        return Ok(Json(CustomerLookupResponse {
            message: "Cliente não cadastrado!".to_string(),
            data: None,
        }));
    };

    let message = format!(
        "Cliente encontrado com sucesso! Nome: {}, Celular: {}, Email: {}",
        field_text(&customer, "NomeCli"),
        field_text(&customer, "Celular"),
        field_text(&customer, "eMail"),
    );

    Ok(Json(CustomerLookupResponse {
        message,
        data: Some(customer),
    }))
}

fn field_text(record: &Record, column: &str) -> String {
    match record.get(column) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        let record = json!({"NomeCli": "Ana", "eMail": null, "Celular": 5511})
            .as_object()
            .cloned()
            .unwrap();

        assert_eq!(field_text(&record, "NomeCli"), "Ana");
        assert_eq!(field_text(&record, "eMail"), "");
        assert_eq!(field_text(&record, "Celular"), "5511");
        assert_eq!(field_text(&record, "Missing"), "");
    }
}
