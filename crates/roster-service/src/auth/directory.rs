//! Lookups the authorization core consumes but never performs itself.

use std::collections::HashMap;

use async_trait::async_trait;
use roster_core::filter::{FileFilter, ListScope};
use roster_core::types::{FileRecord, MemberContext, Role};
use roster_db::db::DbProvider;
use roster_db::db::connection::DbPool;
use roster_db::db::query::{file, member};
use serde::Deserialize;

use crate::error::{ServiceError, ServiceResult};

use super::policy::requirement_for_file;

/// Source of files and member memberships.
#[async_trait]
pub trait AccessDirectory: Send + Sync {
    async fn find_file(&self, file_id: uuid::Uuid) -> ServiceResult<Option<FileRecord>>;

    async fn find_member(&self, member_id: uuid::Uuid) -> ServiceResult<Option<MemberContext>>;

    /// Files matching `filter` inside `scope`, ordered by name then id.
    ///
    /// A malformed file inside `scope` is a fault, whether or not it matches.
    async fn list_files(
        &self,
        filter: &FileFilter,
        scope: &ListScope,
    ) -> ServiceResult<Vec<FileRecord>>;
}

#[async_trait]
impl AccessDirectory for DbPool {
    async fn find_file(&self, file_id: uuid::Uuid) -> ServiceResult<Option<FileRecord>> {
        let mut conn = self.get_connection().await?;
        Ok(file::find_file(&mut conn, file_id).await?)
    }

    async fn find_member(&self, member_id: uuid::Uuid) -> ServiceResult<Option<MemberContext>> {
        let mut conn = self.get_connection().await?;
        Ok(member::find_member(&mut conn, member_id).await?)
    }

    async fn list_files(
        &self,
        filter: &FileFilter,
        scope: &ListScope,
    ) -> ServiceResult<Vec<FileRecord>> {
        let mut conn = self.get_connection().await?;
        Ok(file::list_visible_files(&mut conn, filter, scope).await?)
    }
}

/// A member as written in a JSON catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberEntry {
    pub id: uuid::Uuid,
    pub role: Role,
    #[serde(default)]
    pub committee_ids: Vec<uuid::Uuid>,
}

/// JSON catalog of files and members.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub members: Vec<MemberEntry>,
}

/// Directory held in memory, loaded from a [`Catalog`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    files: HashMap<uuid::Uuid, FileRecord>,
    members: HashMap<uuid::Uuid, MemberContext>,
}

impl InMemoryDirectory {
    /// ## Summary
    /// Builds a directory from a catalog.
    ///
    /// ## Errors
    /// Returns a fault if a member carries the anonymous role or an id appears twice.
    pub fn from_catalog(catalog: Catalog) -> ServiceResult<Self> {
        let mut directory = Self::default();

        for entry in catalog.members {
            let ctx = MemberContext::new(entry.id, entry.role, entry.committee_ids)?;
            if directory.members.insert(entry.id, ctx).is_some() {
                return Err(ServiceError::ParseError(format!(
                    "duplicate member {} in catalog",
                    entry.id
                )));
            }
        }

        for record in catalog.files {
            let id = record.id;
            if directory.files.insert(id, record).is_some() {
                return Err(ServiceError::ParseError(format!(
                    "duplicate file {id} in catalog"
                )));
            }
        }

        Ok(directory)
    }

    /// ## Summary
    /// Parses a JSON catalog.
    ///
    /// ## Errors
    /// Returns `ParseError` for invalid JSON or unknown enum text.
    pub fn from_json_str(json: &str) -> ServiceResult<Self> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|e| ServiceError::ParseError(e.to_string()))?;
        Self::from_catalog(catalog)
    }

    /// ## Summary
    /// Reads and parses a JSON catalog file.
    ///
    /// ## Errors
    /// Returns `ParseError` if the file cannot be read or parsed.
    #[tracing::instrument]
    pub async fn from_json_file(path: &str) -> ServiceResult<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::ParseError(format!("cannot read {path}: {e}")))?;
        let directory = Self::from_json_str(&json)?;

        tracing::info!(
            file_count = directory.files.len(),
            member_count = directory.members.len(),
            "Catalog loaded"
        );
        Ok(directory)
    }
}

#[async_trait]
impl AccessDirectory for InMemoryDirectory {
    async fn find_file(&self, file_id: uuid::Uuid) -> ServiceResult<Option<FileRecord>> {
        Ok(self.files.get(&file_id).cloned())
    }

    async fn find_member(&self, member_id: uuid::Uuid) -> ServiceResult<Option<MemberContext>> {
        Ok(self.members.get(&member_id).cloned())
    }

    async fn list_files(
        &self,
        filter: &FileFilter,
        scope: &ListScope,
    ) -> ServiceResult<Vec<FileRecord>> {
        let mut files = Vec::new();
        for file in self.files.values().filter(|f| scope.contains(f)) {
            // A malformed file faults the listing instead of being silently dropped.
            requirement_for_file(file)?;
            if filter.matches(file) {
                files.push(file.clone());
            }
        }
        files.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::types::Visibility;

    const CATALOG: &str = r#"{
        "members": [
            { "id": "00000000-0000-0000-0000-000000000001", "role": "member" }
        ],
        "files": [
            {
                "id": "00000000-0000-0000-0000-0000000000f2",
                "name": "b.pdf",
                "object_type": "GENERAL",
                "visibility": "MEMBERS_ONLY"
            },
            {
                "id": "00000000-0000-0000-0000-0000000000f1",
                "name": "a.pdf",
                "object_type": "EVENT",
                "visibility": "PUBLIC"
            }
        ]
    }"#;

    #[test_log::test(tokio::test)]
    async fn lists_in_name_order_through_filter() {
        let directory = InMemoryDirectory::from_json_str(CATALOG).unwrap();

        let all = directory
            .list_files(&FileFilter::Everything, &ListScope::default())
            .await
            .unwrap();
        let names: Vec<_> = all.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);

        let scope = ListScope {
            visibility: Some(Visibility::MembersOnly),
            ..ListScope::default()
        };
        let scoped = directory
            .list_files(&FileFilter::Everything, &scope)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].name, "b.pdf");
    }

    #[test_log::test(tokio::test)]
    async fn finds_members_and_files() {
        let directory = InMemoryDirectory::from_json_str(CATALOG).unwrap();

        let member = directory
            .find_member(uuid::Uuid::from_u128(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(member.role(), Role::Member);

        assert!(directory.find_file(uuid::Uuid::from_u128(0xf1)).await.unwrap().is_some());
        assert!(directory.find_file(uuid::Uuid::from_u128(0xf3)).await.unwrap().is_none());
    }

    #[test]
    fn unknown_visibility_in_catalog_is_a_fault() {
        let json = r#"{ "files": [ {
            "id": "00000000-0000-0000-0000-0000000000f1",
            "name": "x", "object_type": "EVENT", "visibility": "SECRET"
        } ] }"#;

        let err = InMemoryDirectory::from_json_str(json).unwrap_err();
        assert!(matches!(&err, ServiceError::ParseError(msg) if msg.contains("Unknown visibility")));
        assert!(err.is_fault());
    }

    #[test_log::test(tokio::test)]
    async fn malformed_file_in_scope_faults_listing() {
        let json = r#"{ "files": [ {
            "id": "00000000-0000-0000-0000-0000000000f1",
            "name": "orphan.pdf", "object_type": "MEMBER", "visibility": "PRIVATE"
        } ] }"#;
        let directory = InMemoryDirectory::from_json_str(json).unwrap();

        let err = directory
            .list_files(&FileFilter::AnyOf(Vec::new()), &ListScope::default())
            .await
            .unwrap_err();
        assert!(err.is_fault(), "{err}");

        let elsewhere = ListScope {
            visibility: Some(Visibility::Public),
            ..ListScope::default()
        };
        assert!(directory
            .list_files(&FileFilter::Everything, &elsewhere)
            .await
            .unwrap()
            .is_empty());
    }

    #[test]
    fn anonymous_member_in_catalog_is_a_fault() {
        let json = r#"{ "members": [
            { "id": "00000000-0000-0000-0000-000000000001", "role": "anonymous" }
        ] }"#;

        assert!(matches!(
            InMemoryDirectory::from_json_str(json),
            Err(ServiceError::CoreError(_))
        ));
    }
}
