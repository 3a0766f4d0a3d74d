use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use balcao_persist::{Record, ThreadInput};
use crate::{
    error::{ApiError, ApiResult},
    extract::{json_body, lenient_string},
    normalize::{log_sql_error, ErrorMessages},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpsertThreadRequest {
    /// Up to 50 chars
    #[serde(rename = "ThreadId", default, deserialize_with = "lenient_string")]
    pub thread_id: Option<String>,
    /// Up to 20 chars
    #[serde(rename = "Celular", default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    /// Up to 200 chars
    #[serde(rename = "Assunto", default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteThreadRequest {
    /// Thread key, spelled as the procedures expect
    #[serde(rename = "TreadId", default, deserialize_with = "lenient_string")]
    pub thread_id: Option<String>,
    /// Restricts the delete to this phone when present
    #[serde(rename = "Celular", default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ThreadsByPhoneQuery {
    /// Phone whose threads are listed
    pub celular: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpsertThreadResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub data: UpsertThreadData,
}

#[derive(Debug, Serialize)]
pub struct UpsertThreadData {
    #[serde(rename = "ThreadId")]
    pub thread_id: String,
    #[serde(rename = "Celular")]
    pub phone: String,
    #[serde(rename = "Assunto")]
    pub subject: String,
    pub resultado: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct ThreadListResponse {
    pub status: &'static str,
    pub results: usize,
    pub data: Vec<Record>,
}

impl ThreadListResponse {
    fn success(data: Vec<Record>) -> Self {
        Self {
            status: "success",
            results: data.len(),
            data,
        }
    }
}

/// Create or update a thread
#[utoipa::path(
    post,
    path = "/threads",
    request_body = UpsertThreadRequest,
    responses(
        (status = 200, description = "Thread created or updated"),
        (status = 400, description = "Missing ThreadId, Celular or Assunto"),
        (status = 500, description = "Procedure failure")
    ),
    tag = "threads"
)]
pub async fn upsert_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UpsertThreadResponse>> {
    let req: UpsertThreadRequest = json_body(&headers, &body)?;

    let (Some(thread_id), Some(phone), Some(subject)) = (req.thread_id, req.phone, req.subject) else {
        return Err(ApiError::bad_request("Dados incompletos")
            .status("fail")
            .suggestion("Verifique: ThreadId (até 50 chars), Celular (até 20 chars), Assunto não vazio"));
    };

    let input = ThreadInput {
        thread_id,
        phone,
        subject,
    };

    let rows = state.threads.upsert(&input).await.map_err(|e| {
        ApiError::internal("Falha na operação")
            .status("fail")
            .messages(log_sql_error(&e))
            .suggestion("Verifique os dados enviados e tente novamente")
    })?;

    Ok(Json(UpsertThreadResponse {
        status: "success",
        message: "Thread criada/atualizada com sucesso",
        data: UpsertThreadData {
            thread_id: input.thread_id,
            phone: input.phone,
            subject: input.subject,
            resultado: rows,
        },
    }))
}

/// List threads for a phone
#[utoipa::path(
    get,
    path = "/threads",
    params(ThreadsByPhoneQuery),
    responses(
        (status = 200, description = "Threads for the phone"),
        (status = 400, description = "Missing or malformed celular query parameter"),
        (status = 500, description = "Procedure failure")
    ),
    tag = "threads"
)]
pub async fn list_threads_by_phone(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ThreadsByPhoneQuery>, QueryRejection>,
) -> ApiResult<Json<ThreadListResponse>> {
    let Query(query) = query.map_err(|rejection| {
        ApiError::bad_request("Query string inválida")
            .status("fail")
            .messages(ErrorMessages::single("INVALID_QUERY", rejection.body_text()))
    })?;

    let Some(phone) = query.celular.filter(|c| !c.is_empty()) else {
        return Err(ApiError::bad_request("Parâmetro obrigatório")
            .status("fail")
            .messages(ErrorMessages::single(
                "MISSING_PARAM",
                "O parâmetro 'celular' é obrigatório na query string",
            )));
    };

    let rows = state.threads.list_by_phone(&phone).await.map_err(|e| {
        tracing::error!(error = %e, "Thread lookup failed");
        ApiError::internal("Falha na busca")
            .status("error")
            .messages(ErrorMessages::single(
                e.code().unwrap_or("UNKNOWN_ERROR"),
                e.message(),
            ))
            .suggestion("O formato do celular deve ser '5511999999999'")
    })?;

    Ok(Json(ThreadListResponse::success(rows)))
}

/// List every thread
#[utoipa::path(
    get,
    path = "/threads/all",
    responses(
        (status = 200, description = "All threads"),
        (status = 500, description = "Procedure failure")
    ),
    tag = "threads"
)]
pub async fn list_all_threads(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ThreadListResponse>> {
    let rows = state.threads.list_all().await.map_err(|e| {
        ApiError::internal("Falha na listagem")
            .status("error")
            .messages(log_sql_error(&e))
            .suggestion("Verifique se a procedure SpSeThreadIA existe no banco")
    })?;

    Ok(Json(ThreadListResponse::success(rows)))
}

/// Delete a thread
#[utoipa::path(
    delete,
    path = "/threads",
    request_body = DeleteThreadRequest,
    responses(
        (status = 204, description = "Thread deleted"),
        (status = 400, description = "Missing TreadId or procedure failure")
    ),
    tag = "threads"
)]
pub async fn delete_thread(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let req: DeleteThreadRequest = json_body(&headers, &body)?;

    let Some(thread_id) = req.thread_id else {
        return Err(ApiError::bad_request("TreadId é obrigatório para exclusão")
            .status("fail")
            .messages(ErrorMessages::single(
                "MISSING_TREADID",
                "O campo 'TreadId' deve ser fornecido",
            )));
    };

    state
        .threads
        .delete(&thread_id, req.phone.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, thread_id = %thread_id, "Thread delete failed");
            ApiError::bad_request("Exclusão falhou")
                .status("fail")
                .messages(ErrorMessages::single("EREQUEST", e.message()))
                .suggestion("Verifique se a thread existe e tente novamente")
        })?;

    Ok(StatusCode::NO_CONTENT)
}
