//! Declarative file filters.
//!
//! A [`FileFilter`] describes which files a requester may see without
//! enumerating them. The same value is evaluated in memory through
//! [`FileFilter::matches`] and lowered to SQL by the storage layer.

use crate::types::{FileRecord, ObjectType, Visibility};

/// Ownership condition attached to a filter clause.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "ids")]
pub enum OwnershipMatch {
    /// `owner_member_id` equals the given member.
    Member(uuid::Uuid),
    /// `owner_committee_id` is one of the given committees. Never empty.
    Committees(Vec<uuid::Uuid>),
}

impl OwnershipMatch {
    /// Returns `true` if the file's owner slot satisfies this condition.
    ///
    /// An empty slot never matches, the same way `NULL` never compares equal in SQL.
    #[must_use]
    pub fn matches(&self, file: &FileRecord) -> bool {
        match self {
            Self::Member(member_id) => file.owner_member_id == Some(*member_id),
            Self::Committees(committee_ids) => file
                .owner_committee_id
                .is_some_and(|id| committee_ids.contains(&id)),
        }
    }
}

/// `visibility = V [AND object_type IN (..)] [AND <ownership>]`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FilterClause {
    pub visibility: Visibility,
    /// `None` means every object type.
    pub object_types: Option<Vec<ObjectType>>,
    pub ownership: Option<OwnershipMatch>,
}

impl FilterClause {
    #[must_use]
    pub fn matches(&self, file: &FileRecord) -> bool {
        if file.visibility != self.visibility {
            return false;
        }
        if let Some(types) = &self.object_types
            && !types.contains(&file.object_type)
        {
            return false;
        }
        self.ownership
            .as_ref()
            .is_none_or(|ownership| ownership.matches(file))
    }
}

/// Filter over files, usable both in memory and at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "clauses")]
pub enum FileFilter {
    /// No restriction.
    Everything,
    /// Disjunction of clauses. An empty list matches nothing.
    AnyOf(Vec<FilterClause>),
}

impl FileFilter {
    #[must_use]
    pub fn matches(&self, file: &FileRecord) -> bool {
        match self {
            Self::Everything => true,
            Self::AnyOf(clauses) => clauses.iter().any(|clause| clause.matches(file)),
        }
    }

    /// Clauses of this filter; empty for [`FileFilter::Everything`].
    #[must_use]
    pub fn clauses(&self) -> &[FilterClause] {
        match self {
            Self::Everything => &[],
            Self::AnyOf(clauses) => clauses,
        }
    }
}

/// Narrowing applied by list endpoints on top of the visibility filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListScope {
    #[serde(default)]
    pub object_type: Option<ObjectType>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub owner_member_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub owner_committee_id: Option<uuid::Uuid>,
}

impl ListScope {
    /// Returns `true` if the file falls inside this scope.
    #[must_use]
    pub fn contains(&self, file: &FileRecord) -> bool {
        self.object_type.is_none_or(|t| t == file.object_type)
            && self.visibility.is_none_or(|v| v == file.visibility)
            && self
                .owner_member_id
                .is_none_or(|id| file.owner_member_id == Some(id))
            && self
                .owner_committee_id
                .is_none_or(|id| file.owner_committee_id == Some(id))
    }
}
