//! Access authorizer.
//!
//! A decision runs two independent checks: a tier check on the requester's
//! role and, for ownership-based requirements, an ownership check on the
//! file. Both the single-file decision here and the list filter in
//! `auth::filter` go through [`Authorizer::grant`], so they cannot disagree.

use std::sync::Arc;

use roster_core::filter::OwnershipMatch;
use roster_core::types::{FileRecord, Requester};

use crate::error::ServiceResult;

use super::policy::{Requirement, requirement_for_file};
use super::tier::{Tier, TierTable};

/// Rule that failed for a denied request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialReason {
    RequiresMember,
    RequiresCommitteeMembership,
    RequiresBoardRole,
    NotFileOwner,
}

impl DenialReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RequiresMember => "requires member",
            Self::RequiresCommitteeMembership => "requires committee membership",
            Self::RequiresBoardRole => "requires board role",
            Self::NotFileOwner => "not the file owner",
        }
    }
}

impl std::fmt::Display for DenialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl serde::Serialize for DenialReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of an access check.
///
/// `reason` is set only on denial and is meant for logs and debugging;
/// callers branch on `authorized` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AuthorizationResult {
    pub authorized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl AuthorizationResult {
    #[must_use]
    pub const fn allowed() -> Self {
        Self {
            authorized: true,
            reason: None,
        }
    }

    #[must_use]
    pub const fn denied(reason: DenialReason) -> Self {
        Self {
            authorized: false,
            reason: Some(reason),
        }
    }
}

/// What a requirement means for one requester, before looking at a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grant {
    /// Satisfied for every file with this requirement.
    Unconditional,
    /// Satisfied only for files whose owner matches; otherwise denied with the reason.
    Conditional(OwnershipMatch, DenialReason),
    /// Never satisfied.
    Denied(DenialReason),
}

/// Authorization decisions for files.
///
/// Holds the tier snapshot only; every method is a pure function of its
/// arguments and may be called concurrently.
#[derive(Debug, Clone)]
pub struct Authorizer {
    tiers: Arc<TierTable>,
}

impl Authorizer {
    #[must_use]
    pub fn new(tiers: Arc<TierTable>) -> Self {
        Self { tiers }
    }

    /// Evaluates a requirement against a requester.
    ///
    /// Admins are not special-cased here; the override is applied by callers
    /// before grants are consulted.
    #[must_use]
    pub fn grant(&self, requester: &Requester, requirement: Requirement) -> Grant {
        let role = requester.role();
        let tier_grant = |tier: Tier, reason: DenialReason| {
            if self.tiers.holds(role, tier) {
                Grant::Unconditional
            } else {
                Grant::Denied(reason)
            }
        };

        match requirement {
            Requirement::Anyone => tier_grant(Tier::Public, DenialReason::RequiresMember),
            Requirement::Member => tier_grant(Tier::Member, DenialReason::RequiresMember),
            Requirement::BoardRole => tier_grant(Tier::Board, DenialReason::RequiresBoardRole),
            Requirement::CommitteeMembership | Requirement::MemberOwnership => {
                // Tier check first: ownership only applies to members.
                let ctx = match requester {
                    Requester::Member(ctx) if self.tiers.holds(role, Tier::Member) => ctx,
                    Requester::Anonymous | Requester::Member(_) => {
                        return Grant::Denied(DenialReason::RequiresMember);
                    }
                };

                if requirement == Requirement::MemberOwnership {
                    return Grant::Conditional(
                        OwnershipMatch::Member(ctx.member_id()),
                        DenialReason::NotFileOwner,
                    );
                }

                if ctx.committee_ids().is_empty() {
                    Grant::Denied(DenialReason::RequiresCommitteeMembership)
                } else {
                    Grant::Conditional(
                        OwnershipMatch::Committees(ctx.committee_ids().to_vec()),
                        DenialReason::RequiresCommitteeMembership,
                    )
                }
            }
        }
    }

    /// ## Summary
    /// Decides whether `requester` may see `file`.
    ///
    /// Admins always pass. A denial is a normal result carrying the failed rule.
    ///
    /// ## Errors
    /// Returns a `CoreError::MalformedInput` fault if the file lacks the owner
    /// slot its visibility needs. This is checked before the admin override.
    pub fn authorize(
        &self,
        requester: &Requester,
        file: &FileRecord,
    ) -> ServiceResult<AuthorizationResult> {
        let requirement = requirement_for_file(file)?;

        if requester.is_admin() {
            tracing::debug!(
                requester = %requester,
                file_id = %file.id,
                visibility = %file.visibility,
                "Admin override"
            );
            return Ok(AuthorizationResult::allowed());
        }

        let result = match self.grant(requester, requirement) {
            Grant::Unconditional => AuthorizationResult::allowed(),
            Grant::Conditional(ownership, reason) => {
                if ownership.matches(file) {
                    AuthorizationResult::allowed()
                } else {
                    AuthorizationResult::denied(reason)
                }
            }
            Grant::Denied(reason) => AuthorizationResult::denied(reason),
        };

        tracing::debug!(
            requester = %requester,
            file_id = %file.id,
            visibility = %file.visibility,
            object_type = %file.object_type,
            requirement = ?requirement,
            authorized = result.authorized,
            "File access decided"
        );

        Ok(result)
    }
}

impl Default for Authorizer {
    fn default() -> Self {
        Self::new(Arc::new(TierTable::standard()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use roster_core::error::CoreError;
    use roster_core::types::{MemberContext, ObjectType, Role, Visibility};

    fn member(id: u128, role: Role, committees: &[u128]) -> Requester {
        MemberContext::new(
            uuid::Uuid::from_u128(id),
            role,
            committees.iter().map(|c| uuid::Uuid::from_u128(*c)),
        )
        .unwrap()
        .into()
    }

    fn file(visibility: Visibility, object_type: ObjectType) -> FileRecord {
        FileRecord {
            id: uuid::Uuid::now_v7(),
            name: "newsletter.pdf".to_string(),
            object_type,
            visibility,
            owner_member_id: None,
            owner_committee_id: None,
        }
    }

    #[test]
    fn member_sees_members_only_file() {
        let authz = Authorizer::default();
        let result = authz
            .authorize(
                &member(1, Role::Member, &[]),
                &file(Visibility::MembersOnly, ObjectType::General),
            )
            .unwrap();

        assert_eq!(result, AuthorizationResult::allowed());
    }

    #[test]
    fn anonymous_denied_members_only_file() {
        let authz = Authorizer::default();
        let result = authz
            .authorize(
                &Requester::Anonymous,
                &file(Visibility::MembersOnly, ObjectType::General),
            )
            .unwrap();

        assert!(!result.authorized);
        assert_eq!(result.reason.map(DenialReason::as_str), Some("requires member"));
    }

    #[test]
    fn private_file_of_another_member_is_denied() {
        let authz = Authorizer::default();
        let mut f = file(Visibility::Private, ObjectType::Member);
        f.owner_member_id = Some(uuid::Uuid::from_u128(2));

        let result = authz.authorize(&member(1, Role::Member, &[]), &f).unwrap();
        assert_eq!(result, AuthorizationResult::denied(DenialReason::NotFileOwner));
        assert_eq!(result.reason.unwrap().to_string(), "not the file owner");

        let result = authz.authorize(&member(2, Role::Member, &[]), &f).unwrap();
        assert!(result.authorized);
    }

    #[test]
    fn committee_only_requires_owning_committee() {
        let authz = Authorizer::default();
        let mut f = file(Visibility::CommitteeOnly, ObjectType::Event);
        f.owner_committee_id = Some(uuid::Uuid::from_u128(10));

        let outsider = member(1, Role::CommitteeMember, &[11]);
        assert_eq!(
            authz.authorize(&outsider, &f).unwrap(),
            AuthorizationResult::denied(DenialReason::RequiresCommitteeMembership)
        );

        let insider = member(2, Role::Member, &[10, 11]);
        assert!(authz.authorize(&insider, &f).unwrap().authorized);

        assert_eq!(
            authz.authorize(&Requester::Anonymous, &f).unwrap(),
            AuthorizationResult::denied(DenialReason::RequiresMember)
        );
    }

    #[test]
    fn board_only_requires_board_tier() {
        let authz = Authorizer::default();
        let f = file(Visibility::BoardOnly, ObjectType::BoardRecord);

        assert_eq!(
            authz.authorize(&member(1, Role::CommitteeMember, &[5]), &f).unwrap(),
            AuthorizationResult::denied(DenialReason::RequiresBoardRole)
        );
        assert!(authz.authorize(&member(1, Role::BoardMember, &[]), &f).unwrap().authorized);
    }

    #[test]
    fn admin_passes_every_well_formed_file() {
        let authz = Authorizer::default();
        let admin = member(99, Role::Admin, &[]);

        for visibility in Visibility::ALL {
            for object_type in ObjectType::ALL {
                let mut f = file(visibility, object_type);
                f.owner_member_id = Some(uuid::Uuid::from_u128(1));
                f.owner_committee_id = Some(uuid::Uuid::from_u128(2));
                assert!(authz.authorize(&admin, &f).unwrap().authorized);
            }
        }
    }

    #[test]
    fn malformed_file_faults_even_for_admin() {
        let authz = Authorizer::default();
        let f = file(Visibility::Private, ObjectType::General);

        let err = authz.authorize(&member(99, Role::Admin, &[]), &f).unwrap_err();
        assert!(matches!(err, ServiceError::CoreError(CoreError::MalformedInput(_))));
        assert!(err.is_fault());
    }

    #[test]
    fn repeated_calls_agree() {
        let authz = Authorizer::default();
        let requester = member(1, Role::Member, &[3]);
        let mut f = file(Visibility::CommitteeOnly, ObjectType::Committee);
        f.owner_committee_id = Some(uuid::Uuid::from_u128(4));

        let first = authz.authorize(&requester, &f).unwrap();
        for _ in 0..10 {
            assert_eq!(authz.authorize(&requester, &f).unwrap(), first);
        }
    }

    #[test]
    fn result_serializes_reason_only_on_denial() {
        let allowed = serde_json::to_value(AuthorizationResult::allowed()).unwrap();
        assert_eq!(allowed, serde_json::json!({ "authorized": true }));

        let denied = serde_json::to_value(AuthorizationResult::denied(DenialReason::RequiresBoardRole))
            .unwrap();
        assert_eq!(
            denied,
            serde_json::json!({ "authorized": false, "reason": "requires board role" })
        );
    }
}
