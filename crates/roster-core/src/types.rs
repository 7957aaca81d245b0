//! Closed domain model for file access decisions.
//!
//! Text that does not name a known variant fails to parse with a
//! [`CoreError`]; it never maps to a default.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Declared access tier of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum Visibility {
    Public,
    MembersOnly,
    CommitteeOnly,
    BoardOnly,
    Private,
}

impl Visibility {
    /// All visibilities, least restricted first.
    pub const ALL: [Self; 5] = [
        Self::Public,
        Self::MembersOnly,
        Self::CommitteeOnly,
        Self::BoardOnly,
        Self::Private,
    ];

    /// Returns the storage/wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "PUBLIC",
            Self::MembersOnly => "MEMBERS_ONLY",
            Self::CommitteeOnly => "COMMITTEE_ONLY",
            Self::BoardOnly => "BOARD_ONLY",
            Self::Private => "PRIVATE",
        }
    }
}

impl FromStr for Visibility {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "PUBLIC" => Ok(Self::Public),
            "MEMBERS_ONLY" => Ok(Self::MembersOnly),
            "COMMITTEE_ONLY" => Ok(Self::CommitteeOnly),
            "BOARD_ONLY" => Ok(Self::BoardOnly),
            "PRIVATE" => Ok(Self::Private),
            other => Err(CoreError::UnknownVisibility(other.to_string())),
        }
    }
}

impl TryFrom<String> for Visibility {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity a file is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ObjectType {
    Event,
    Member,
    Committee,
    BoardRecord,
    General,
}

impl ObjectType {
    pub const ALL: [Self; 5] = [
        Self::Event,
        Self::Member,
        Self::Committee,
        Self::BoardRecord,
        Self::General,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "EVENT",
            Self::Member => "MEMBER",
            Self::Committee => "COMMITTEE",
            Self::BoardRecord => "BOARD_RECORD",
            Self::General => "GENERAL",
        }
    }
}

impl FromStr for ObjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "EVENT" => Ok(Self::Event),
            "MEMBER" => Ok(Self::Member),
            "COMMITTEE" => Ok(Self::Committee),
            "BOARD_RECORD" => Ok(Self::BoardRecord),
            "GENERAL" => Ok(Self::General),
            other => Err(CoreError::UnknownObjectType(other.to_string())),
        }
    }
}

impl TryFrom<String> for ObjectType {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a requester within the organization.
///
/// The text form doubles as the Casbin subject for tier checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Role {
    Anonymous,
    Member,
    CommitteeMember,
    BoardMember,
    Admin,
}

impl Role {
    pub const ALL: [Self; 5] = [
        Self::Anonymous,
        Self::Member,
        Self::CommitteeMember,
        Self::BoardMember,
        Self::Admin,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::Member => "member",
            Self::CommitteeMember => "committee-member",
            Self::BoardMember => "board-member",
            Self::Admin => "admin",
        }
    }

    /// Returns `true` for every role except [`Role::Anonymous`].
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        !matches!(self, Self::Anonymous)
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "anonymous" => Ok(Self::Anonymous),
            "member" => Ok(Self::Member),
            "committee-member" => Ok(Self::CommitteeMember),
            "board-member" => Ok(Self::BoardMember),
            "admin" => Ok(Self::Admin),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        value.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored file as seen by access checks.
///
/// Ownership slots:
/// - `owner_member_id`: the designated owner (the member a `MEMBER` file is
///   about, an event organizer, the uploader of a `GENERAL` file).
/// - `owner_committee_id`: the committee that owns or hosts the object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    pub id: uuid::Uuid,
    pub name: String,
    pub object_type: ObjectType,
    pub visibility: Visibility,
    #[serde(default)]
    pub owner_member_id: Option<uuid::Uuid>,
    #[serde(default)]
    pub owner_committee_id: Option<uuid::Uuid>,
}

/// Identity and memberships of an authenticated requester.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MemberContext {
    member_id: uuid::Uuid,
    role: Role,
    committee_ids: Vec<uuid::Uuid>,
}

impl MemberContext {
    /// ## Summary
    /// Builds the context of an authenticated member.
    ///
    /// ## Errors
    /// Returns `MalformedInput` when `role` is [`Role::Anonymous`].
    pub fn new(
        member_id: uuid::Uuid,
        role: Role,
        committee_ids: impl IntoIterator<Item = uuid::Uuid>,
    ) -> CoreResult<Self> {
        if !role.is_authenticated() {
            return Err(CoreError::MalformedInput(format!(
                "member {member_id} cannot carry the anonymous role"
            )));
        }

        let mut committee_ids: Vec<_> = committee_ids.into_iter().collect();
        committee_ids.sort_unstable();
        committee_ids.dedup();

        Ok(Self {
            member_id,
            role,
            committee_ids,
        })
    }

    #[must_use]
    pub const fn member_id(&self) -> uuid::Uuid {
        self.member_id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Committees the member belongs to, sorted and deduplicated.
    #[must_use]
    pub fn committee_ids(&self) -> &[uuid::Uuid] {
        &self.committee_ids
    }
}

/// The identity and role context performing an access check.
///
/// Always passed explicitly; there is no ambient "current user".
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum Requester {
    Anonymous,
    Member(MemberContext),
}

impl Requester {
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Anonymous => Role::Anonymous,
            Self::Member(ctx) => ctx.role,
        }
    }

    #[must_use]
    pub const fn member_id(&self) -> Option<uuid::Uuid> {
        match self {
            Self::Anonymous => None,
            Self::Member(ctx) => Some(ctx.member_id),
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role(), Role::Admin)
    }
}

impl From<MemberContext> for Requester {
    fn from(ctx: MemberContext) -> Self {
        Self::Member(ctx)
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("anonymous"),
            Self::Member(ctx) => write!(f, "{}:{}", ctx.role, ctx.member_id),
        }
    }
}
