//! Access requests read from JSON and dispatched to the file access service.

use http::StatusCode;
use roster_core::types::{FileRecord, Requester};
use roster_service::auth::{
    AccessDirectory, FileAccessParams, FileAccessService, FileListParams, FilterParams,
    RequesterParams, status_for_error,
};
use roster_service::error::{ServiceError, ServiceResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AccessRequest {
    /// Single-file check by id.
    Access(FileAccessParams),
    /// List check, returning the visible files when allowed.
    List(FileListParams),
    Filter(FilterParams),
    /// Decision for an inline requester and file, without directory lookups.
    Evaluate {
        requester: RequesterParams,
        file: FileRecord,
    },
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl AccessResponse {
    fn new<T: Serialize>(status: StatusCode, body: &T) -> ServiceResult<Self> {
        let body =
            serde_json::to_value(body).map_err(|e| ServiceError::ParseError(e.to_string()))?;
        Ok(Self {
            status: status.as_u16(),
            body,
        })
    }

    fn from_error(err: &ServiceError) -> Self {
        Self {
            status: status_for_error(err).as_u16(),
            body: serde_json::json!({ "error": err.to_string() }),
        }
    }
}

/// ## Summary
/// Runs one request against `service`.
///
/// Service errors are answered with their HTTP status and message, so the
/// caller always gets a response.
pub async fn dispatch<D: AccessDirectory>(
    service: &FileAccessService<D>,
    request: AccessRequest,
) -> AccessResponse {
    let outcome = match request {
        AccessRequest::Access(params) => service
            .authorize_file_access(&params)
            .await
            .and_then(|result| AccessResponse::new(service.status_for(&result), &result)),
        AccessRequest::List(params) => service
            .list_visible_files(&params)
            .await
            .and_then(|outcome| {
                AccessResponse::new(service.status_for_listing(&outcome), &outcome)
            }),
        AccessRequest::Filter(params) => service
            .visibility_filter(&params)
            .await
            .and_then(|filter| AccessResponse::new(StatusCode::OK, &filter)),
        AccessRequest::Evaluate { requester, file } => evaluate(service, requester, &file),
    };

    outcome.unwrap_or_else(|err| {
        tracing::warn!(error = %err, fault = err.is_fault(), "Request failed");
        AccessResponse::from_error(&err)
    })
}

fn evaluate<D: AccessDirectory>(
    service: &FileAccessService<D>,
    requester: RequesterParams,
    file: &FileRecord,
) -> ServiceResult<AccessResponse> {
    let requester = Requester::try_from(requester)?;
    let result = service.authorizer().authorize(&requester, file)?;
    AccessResponse::new(service.status_for(&result), &result)
}
