//! Visibility policy.
//!
//! Maps a file's declared visibility and object type to the minimal
//! capability a requester needs. Pure and total: every (visibility, object
//! type) pair has exactly one requirement.

use roster_core::error::{CoreError, CoreResult};
use roster_core::types::{FileRecord, ObjectType, Visibility};

/// Minimal requester capability needed to see a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Anyone, including anonymous requesters.
    Anyone,
    /// Any authenticated member.
    Member,
    /// A role holding the board tier.
    BoardRole,
    /// Membership in the committee recorded in `owner_committee_id`.
    CommitteeMembership,
    /// Being the member recorded in `owner_member_id`.
    MemberOwnership,
}

/// Ownership slot of a [`FileRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerSlot {
    Member,
    Committee,
}

impl OwnerSlot {
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Member => "owner_member_id",
            Self::Committee => "owner_committee_id",
        }
    }

    #[must_use]
    pub const fn is_filled(self, file: &FileRecord) -> bool {
        match self {
            Self::Member => file.owner_member_id.is_some(),
            Self::Committee => file.owner_committee_id.is_some(),
        }
    }
}

impl Requirement {
    /// The owner slot this requirement reads, if any.
    #[must_use]
    pub const fn owner_slot(self) -> Option<OwnerSlot> {
        match self {
            Self::Anyone | Self::Member | Self::BoardRole => None,
            Self::CommitteeMembership => Some(OwnerSlot::Committee),
            Self::MemberOwnership => Some(OwnerSlot::Member),
        }
    }
}

/// ## Summary
/// Returns the requirement for a visibility and object type.
///
/// `PRIVATE` files belong to their designated owner: the committee for
/// committee objects, the board for board records, and the owning member
/// for everything else.
#[must_use]
pub const fn requirement_for(visibility: Visibility, object_type: ObjectType) -> Requirement {
    match visibility {
        Visibility::Public => Requirement::Anyone,
        Visibility::MembersOnly => Requirement::Member,
        Visibility::CommitteeOnly => Requirement::CommitteeMembership,
        Visibility::BoardOnly => Requirement::BoardRole,
        Visibility::Private => match object_type {
            ObjectType::Committee => Requirement::CommitteeMembership,
            ObjectType::BoardRecord => Requirement::BoardRole,
            ObjectType::Event | ObjectType::Member | ObjectType::General => {
                Requirement::MemberOwnership
            }
        },
    }
}

/// ## Summary
/// Returns the requirement for a file after checking it is well formed.
///
/// ## Errors
/// Returns `MalformedInput` if the owner slot the requirement reads is empty.
pub fn requirement_for_file(file: &FileRecord) -> CoreResult<Requirement> {
    let requirement = requirement_for(file.visibility, file.object_type);

    if let Some(slot) = requirement.owner_slot()
        && !slot.is_filled(file)
    {
        return Err(CoreError::MalformedInput(format!(
            "{} file {} on {} has no {}",
            file.visibility,
            file.id,
            file.object_type,
            slot.column()
        )));
    }

    Ok(requirement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(visibility: Visibility, object_type: ObjectType) -> FileRecord {
        FileRecord {
            id: uuid::Uuid::now_v7(),
            name: "roster.csv".to_string(),
            object_type,
            visibility,
            owner_member_id: None,
            owner_committee_id: None,
        }
    }

    #[test]
    fn tiers_ignore_object_type() {
        for object_type in ObjectType::ALL {
            assert_eq!(requirement_for(Visibility::Public, object_type), Requirement::Anyone);
            assert_eq!(requirement_for(Visibility::MembersOnly, object_type), Requirement::Member);
            assert_eq!(
                requirement_for(Visibility::CommitteeOnly, object_type),
                Requirement::CommitteeMembership
            );
            assert_eq!(requirement_for(Visibility::BoardOnly, object_type), Requirement::BoardRole);
        }
    }

    #[test]
    fn private_follows_designated_owner() {
        let cases = [
            (ObjectType::Event, Requirement::MemberOwnership),
            (ObjectType::Member, Requirement::MemberOwnership),
            (ObjectType::General, Requirement::MemberOwnership),
            (ObjectType::Committee, Requirement::CommitteeMembership),
            (ObjectType::BoardRecord, Requirement::BoardRole),
        ];

        for (object_type, expected) in cases {
            assert_eq!(requirement_for(Visibility::Private, object_type), expected, "{object_type}");
        }
    }

    #[test]
    fn missing_owner_is_malformed() {
        let err = requirement_for_file(&file(Visibility::Private, ObjectType::Member)).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(msg) if msg.contains("owner_member_id")));

        let err = requirement_for_file(&file(Visibility::CommitteeOnly, ObjectType::Event)).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(msg) if msg.contains("owner_committee_id")));
    }

    #[test]
    fn ownerless_tiers_are_well_formed() {
        for visibility in [Visibility::Public, Visibility::MembersOnly, Visibility::BoardOnly] {
            assert!(requirement_for_file(&file(visibility, ObjectType::General)).is_ok());
        }
        assert_eq!(
            requirement_for_file(&file(Visibility::Private, ObjectType::BoardRecord)).unwrap(),
            Requirement::BoardRole
        );
    }
}
