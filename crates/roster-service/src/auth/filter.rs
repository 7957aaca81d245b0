//! List filter and list authorization.
//!
//! The filter is derived by evaluating [`Authorizer::grant`] for every
//! (visibility, object type) pair, so for every well-formed file
//! `build_filter(r).matches(f) == authorize(r, f).authorized`.

use roster_core::filter::{FileFilter, FilterClause, ListScope, OwnershipMatch};
use roster_core::types::{ObjectType, Requester, Visibility};

use crate::error::{ServiceError, ServiceResult};

use super::authorize::{AuthorizationResult, Authorizer, Grant};
use super::policy::requirement_for;

impl Authorizer {
    /// ## Summary
    /// Builds the filter of files `requester` may see.
    ///
    /// Clauses come out in visibility order; a clause covering every object
    /// type carries no object type condition.
    #[must_use]
    pub fn build_filter(&self, requester: &Requester) -> FileFilter {
        if requester.is_admin() {
            return FileFilter::Everything;
        }

        let mut clauses: Vec<FilterClause> = Vec::new();

        for visibility in Visibility::ALL {
            for object_type in ObjectType::ALL {
                let ownership = match self.grant(requester, requirement_for(visibility, object_type))
                {
                    Grant::Unconditional => None,
                    Grant::Conditional(ownership, _) => Some(ownership),
                    Grant::Denied(_) => continue,
                };

                match clauses
                    .iter_mut()
                    .find(|c| c.visibility == visibility && c.ownership == ownership)
                {
                    Some(clause) => clause
                        .object_types
                        .get_or_insert_with(Vec::new)
                        .push(object_type),
                    None => clauses.push(FilterClause {
                        visibility,
                        object_types: Some(vec![object_type]),
                        ownership,
                    }),
                }
            }
        }

        for clause in &mut clauses {
            if clause
                .object_types
                .as_ref()
                .is_some_and(|types| types.len() == ObjectType::ALL.len())
            {
                clause.object_types = None;
            }
        }

        tracing::trace!(
            requester = %requester,
            clause_count = clauses.len(),
            "Visibility filter built"
        );

        FileFilter::AnyOf(clauses)
    }

    /// ## Summary
    /// Decides whether `requester` may list files in `scope`.
    ///
    /// The listing is allowed iff at least one well-formed file inside the
    /// scope would pass [`Authorizer::build_filter`]. Without a pinned
    /// visibility this always holds because public files are visible to
    /// everyone.
    ///
    /// ## Errors
    /// Returns `InvariantViolation` if the scope covers no object type.
    pub fn authorize_list(
        &self,
        requester: &Requester,
        scope: &ListScope,
    ) -> ServiceResult<AuthorizationResult> {
        if requester.is_admin() {
            return Ok(AuthorizationResult::allowed());
        }
        let Some(visibility) = scope.visibility else {
            return Ok(AuthorizationResult::allowed());
        };

        let object_types = scope
            .object_type
            .map_or_else(|| ObjectType::ALL.to_vec(), |t| vec![t]);

        let mut first_denial = None;
        for object_type in object_types {
            let denial = match self.grant(requester, requirement_for(visibility, object_type)) {
                Grant::Unconditional => None,
                Grant::Conditional(ownership, reason) => {
                    (!scope_admits(scope, &ownership)).then_some(reason)
                }
                Grant::Denied(reason) => Some(reason),
            };

            match denial {
                None => return Ok(AuthorizationResult::allowed()),
                Some(reason) => {
                    first_denial.get_or_insert(reason);
                }
            }
        }

        let reason = first_denial.ok_or(ServiceError::InvariantViolation(
            "list scope covers no object type",
        ))?;

        tracing::debug!(
            requester = %requester,
            visibility = %visibility,
            reason = %reason,
            "File listing denied"
        );

        Ok(AuthorizationResult::denied(reason))
    }
}

/// Returns `true` if some file in `scope` can satisfy `ownership`.
fn scope_admits(scope: &ListScope, ownership: &OwnershipMatch) -> bool {
    match ownership {
        OwnershipMatch::Member(member_id) => scope
            .owner_member_id
            .is_none_or(|pinned| pinned == *member_id),
        OwnershipMatch::Committees(committee_ids) => scope
            .owner_committee_id
            .is_none_or(|pinned| committee_ids.contains(&pinned)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::authorize::DenialReason;
    use roster_core::types::{MemberContext, Role};

    fn id(n: u128) -> uuid::Uuid {
        uuid::Uuid::from_u128(n)
    }

    fn member(n: u128, role: Role, committees: &[u128]) -> Requester {
        MemberContext::new(id(n), role, committees.iter().map(|c| id(*c)))
            .unwrap()
            .into()
    }

    #[test]
    fn admin_filter_is_everything() {
        let authz = Authorizer::default();
        assert_eq!(authz.build_filter(&member(1, Role::Admin, &[])), FileFilter::Everything);
    }

    #[test]
    fn anonymous_filter_is_public_only() {
        let authz = Authorizer::default();
        let filter = authz.build_filter(&Requester::Anonymous);

        assert_eq!(
            filter,
            FileFilter::AnyOf(vec![FilterClause {
                visibility: Visibility::Public,
                object_types: None,
                ownership: None,
            }])
        );
    }

    #[test]
    fn member_filter_shape() {
        let authz = Authorizer::default();
        let filter = authz.build_filter(&member(1, Role::Member, &[7]));
        let clauses = filter.clauses();

        let visibilities: Vec<_> = clauses.iter().map(|c| c.visibility).collect();
        assert_eq!(
            visibilities,
            vec![
                Visibility::Public,
                Visibility::MembersOnly,
                Visibility::CommitteeOnly,
                Visibility::Private,
                Visibility::Private,
            ]
        );

        assert_eq!(
            clauses[2].ownership,
            Some(OwnershipMatch::Committees(vec![id(7)]))
        );
        assert_eq!(clauses[2].object_types, None);

        assert_eq!(clauses[3].ownership, Some(OwnershipMatch::Member(id(1))));
        assert_eq!(
            clauses[3].object_types,
            Some(vec![ObjectType::Event, ObjectType::Member, ObjectType::General])
        );
        assert_eq!(clauses[4].object_types, Some(vec![ObjectType::Committee]));
    }

    #[test]
    fn board_member_filter_includes_board_records() {
        let authz = Authorizer::default();
        let filter = authz.build_filter(&member(2, Role::BoardMember, &[]));

        assert!(filter.clauses().iter().any(|c| c.visibility == Visibility::BoardOnly
            && c.object_types.is_none()
            && c.ownership.is_none()));
        assert!(filter.clauses().iter().any(|c| c.visibility == Visibility::Private
            && c.object_types == Some(vec![ObjectType::BoardRecord])
            && c.ownership.is_none()));
        // No committees: no committee clauses at all.
        assert!(filter
            .clauses()
            .iter()
            .all(|c| !matches!(c.ownership, Some(OwnershipMatch::Committees(_)))));
    }

    #[test]
    fn unpinned_list_is_always_allowed() {
        let authz = Authorizer::default();
        let result = authz
            .authorize_list(&Requester::Anonymous, &ListScope::default())
            .unwrap();
        assert!(result.authorized);
    }

    #[test]
    fn board_listing_denied_for_members() {
        let authz = Authorizer::default();
        let scope = ListScope {
            visibility: Some(Visibility::BoardOnly),
            ..ListScope::default()
        };

        assert_eq!(
            authz.authorize_list(&member(1, Role::Member, &[]), &scope).unwrap(),
            AuthorizationResult::denied(DenialReason::RequiresBoardRole)
        );
        assert!(authz
            .authorize_list(&member(1, Role::BoardMember, &[]), &scope)
            .unwrap()
            .authorized);
    }

    #[test]
    fn private_listing_of_someone_else_is_denied() {
        let authz = Authorizer::default();
        let scope = ListScope {
            object_type: Some(ObjectType::Member),
            visibility: Some(Visibility::Private),
            owner_member_id: Some(id(2)),
            ..ListScope::default()
        };

        assert_eq!(
            authz.authorize_list(&member(1, Role::Member, &[]), &scope).unwrap(),
            AuthorizationResult::denied(DenialReason::NotFileOwner)
        );
        assert!(authz
            .authorize_list(&member(2, Role::Member, &[]), &scope)
            .unwrap()
            .authorized);
    }

    #[test]
    fn committee_listing_follows_membership() {
        let authz = Authorizer::default();
        let scope = ListScope {
            visibility: Some(Visibility::CommitteeOnly),
            owner_committee_id: Some(id(30)),
            ..ListScope::default()
        };

        assert_eq!(
            authz.authorize_list(&member(1, Role::Member, &[31]), &scope).unwrap(),
            AuthorizationResult::denied(DenialReason::RequiresCommitteeMembership)
        );
        assert!(authz
            .authorize_list(&member(1, Role::Member, &[30]), &scope)
            .unwrap()
            .authorized);
    }
}
