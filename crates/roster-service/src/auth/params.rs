//! Request parameters accepted at the service boundary.

use roster_core::error::CoreError;
use roster_core::filter::ListScope;
use roster_core::types::{MemberContext, Requester, Role};
use serde::Deserialize;

/// A requester described inline, as sent by callers that already resolved
/// the identity themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct RequesterParams {
    pub role: Role,
    #[serde(default)]
    pub id: Option<uuid::Uuid>,
    #[serde(default)]
    pub committee_ids: Vec<uuid::Uuid>,
}

impl TryFrom<RequesterParams> for Requester {
    type Error = CoreError;

    fn try_from(params: RequesterParams) -> Result<Self, Self::Error> {
        match (params.role, params.id) {
            (Role::Anonymous, None) if params.committee_ids.is_empty() => Ok(Self::Anonymous),
            (Role::Anonymous, _) => Err(CoreError::MalformedInput(
                "anonymous requester cannot carry an id or committees".to_string(),
            )),
            (role, Some(id)) => Ok(MemberContext::new(id, role, params.committee_ids)?.into()),
            (role, None) => Err(CoreError::MalformedInput(format!(
                "{role} requester is missing an id"
            ))),
        }
    }
}

/// Single-file access check.
#[derive(Debug, Clone, Deserialize)]
pub struct FileAccessParams {
    /// Authenticated member, `None` for anonymous requests.
    #[serde(default)]
    pub member_id: Option<uuid::Uuid>,
    /// Member to evaluate the request for instead of the actor. Admin only.
    #[serde(default)]
    pub view_as: Option<uuid::Uuid>,
    pub file_id: uuid::Uuid,
}

/// List endpoint check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileListParams {
    #[serde(default)]
    pub member_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub view_as: Option<uuid::Uuid>,
    #[serde(default)]
    pub scope: ListScope,
}

/// Visibility filter request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub member_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub view_as: Option<uuid::Uuid>,
}
