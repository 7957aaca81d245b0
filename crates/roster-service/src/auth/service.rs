//! File access service for route handlers.
//!
//! Resolves the requester and file through an [`AccessDirectory`], asks the
//! [`Authorizer`], records denials for audit and maps outcomes to HTTP
//! statuses with one global [`DenialStatus`].

use http::StatusCode;
use roster_core::config::DenialStatus;
use roster_core::constants::AUDIT_TARGET;
use roster_core::filter::FileFilter;
use roster_core::types::{FileRecord, Requester};

use crate::error::{ServiceError, ServiceResult};

use super::authorize::{AuthorizationResult, Authorizer, DenialReason};
use super::directory::AccessDirectory;
use super::params::{FileAccessParams, FileListParams, FilterParams};
use super::policy::requirement_for_file;

/// Result of a list request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum ListOutcome {
    Allowed { files: Vec<FileRecord> },
    Denied { reason: DenialReason },
}

pub struct FileAccessService<D> {
    authorizer: Authorizer,
    directory: D,
    denial_status: DenialStatus,
}

impl<D: AccessDirectory> FileAccessService<D> {
    #[must_use]
    pub fn new(authorizer: Authorizer, directory: D, denial_status: DenialStatus) -> Self {
        Self {
            authorizer,
            directory,
            denial_status,
        }
    }

    #[must_use]
    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// ## Summary
    /// Resolves a member id to a requester; `None` is an anonymous requester.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` if the member does not exist, or directory errors.
    pub async fn resolve_requester(&self, member_id: Option<uuid::Uuid>) -> ServiceResult<Requester> {
        let Some(member_id) = member_id else {
            return Ok(Requester::Anonymous);
        };

        match self.directory.find_member(member_id).await? {
            Some(ctx) => Ok(Requester::Member(ctx)),
            None => {
                tracing::debug!(member_id = %member_id, "Unknown member");
                Err(ServiceError::NotAuthenticated)
            }
        }
    }

    /// Resolves the actor and, for admins, the member they are viewing as.
    async fn effective_requester(
        &self,
        member_id: Option<uuid::Uuid>,
        view_as: Option<uuid::Uuid>,
    ) -> ServiceResult<Requester> {
        let actor = self.resolve_requester(member_id).await?;

        let Some(target_id) = view_as else {
            return Ok(actor);
        };

        if !actor.is_admin() {
            tracing::info!(
                target: AUDIT_TARGET,
                actor = %actor,
                view_as = %target_id,
                "View-as refused"
            );
            return Err(ServiceError::AuthorizationError(
                "view-as requires an admin requester".to_string(),
            ));
        }

        let target = self.resolve_requester(Some(target_id)).await?;
        tracing::info!(
            target: AUDIT_TARGET,
            actor = %actor,
            view_as = %target,
            "Viewing as member"
        );
        Ok(target)
    }

    /// ## Summary
    /// Checks single-file access.
    ///
    /// ## Errors
    /// Returns `NotFound` if the file does not exist, `NotAuthenticated` for an
    /// unknown member, or a fault for malformed data.
    #[tracing::instrument(skip(self), fields(file_id = %params.file_id))]
    pub async fn authorize_file_access(
        &self,
        params: &FileAccessParams,
    ) -> ServiceResult<AuthorizationResult> {
        let requester = self
            .effective_requester(params.member_id, params.view_as)
            .await?;

        let file = self
            .directory
            .find_file(params.file_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("file {}", params.file_id)))?;

        let result = self.authorizer.authorize(&requester, &file)?;

        if let Some(reason) = result.reason {
            tracing::info!(
                target: AUDIT_TARGET,
                requester = %requester,
                file_id = %file.id,
                reason = %reason,
                "File access denied"
            );
        }

        Ok(result)
    }

    /// ## Summary
    /// Checks whether a list request may return data.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` for an unknown member, or directory errors.
    #[tracing::instrument(skip(self))]
    pub async fn authorize_file_list(
        &self,
        params: &FileListParams,
    ) -> ServiceResult<AuthorizationResult> {
        let requester = self
            .effective_requester(params.member_id, params.view_as)
            .await?;

        let result = self.authorizer.authorize_list(&requester, &params.scope)?;

        if let Some(reason) = result.reason {
            tracing::info!(
                target: AUDIT_TARGET,
                requester = %requester,
                scope = ?params.scope,
                reason = %reason,
                "File listing denied"
            );
        }

        Ok(result)
    }

    /// ## Summary
    /// Returns the filter of files the requester may see.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` for an unknown member, or directory errors.
    pub async fn visibility_filter(&self, params: &FilterParams) -> ServiceResult<FileFilter> {
        let requester = self
            .effective_requester(params.member_id, params.view_as)
            .await?;
        Ok(self.authorizer.build_filter(&requester))
    }

    /// ## Summary
    /// Authorizes a list request and, when allowed, returns the visible files in scope.
    ///
    /// ## Errors
    /// Returns `NotAuthenticated` for an unknown member, directory errors, or a
    /// fault if a listed file is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn list_visible_files(&self, params: &FileListParams) -> ServiceResult<ListOutcome> {
        let requester = self
            .effective_requester(params.member_id, params.view_as)
            .await?;

        let result = self.authorizer.authorize_list(&requester, &params.scope)?;
        if let Some(reason) = result.reason {
            tracing::info!(
                target: AUDIT_TARGET,
                requester = %requester,
                reason = %reason,
                "File listing denied"
            );
            return Ok(ListOutcome::Denied { reason });
        }

        let filter = self.authorizer.build_filter(&requester);
        let files = self.directory.list_files(&filter, &params.scope).await?;

        // Same fault as the detail check; `Everything` would otherwise return malformed rows.
        for file in &files {
            requirement_for_file(file)?;
        }

        tracing::debug!(file_count = files.len(), "Visible files listed");
        Ok(ListOutcome::Allowed { files })
    }

    /// HTTP status for a decision, shared by detail and list endpoints.
    #[must_use]
    pub const fn status_for(&self, result: &AuthorizationResult) -> StatusCode {
        if result.authorized {
            StatusCode::OK
        } else {
            denial_status_code(self.denial_status)
        }
    }

    /// HTTP status for a list outcome.
    #[must_use]
    pub const fn status_for_listing(&self, outcome: &ListOutcome) -> StatusCode {
        match outcome {
            ListOutcome::Allowed { .. } => StatusCode::OK,
            ListOutcome::Denied { .. } => denial_status_code(self.denial_status),
        }
    }
}

#[must_use]
pub const fn denial_status_code(denial_status: DenialStatus) -> StatusCode {
    match denial_status {
        DenialStatus::NotFound => StatusCode::NOT_FOUND,
        DenialStatus::Forbidden => StatusCode::FORBIDDEN,
    }
}

/// HTTP status for a service error.
#[must_use]
pub const fn status_for_error(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        ServiceError::AuthorizationError(_) => StatusCode::FORBIDDEN,
        ServiceError::CasbinError(_)
        | ServiceError::DatabaseError(_)
        | ServiceError::CoreError(_)
        | ServiceError::InvalidConfiguration(_)
        | ServiceError::InvariantViolation(_)
        | ServiceError::ParseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
