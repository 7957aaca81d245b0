//! Role tiers.
//!
//! A tier is a standing held by a role regardless of any particular file:
//! `public` (everyone), `member` (authenticated members) and `board`
//! (board roles). Which role holds which tier comes from the Casbin policy and
//! is snapshotted into a [`TierTable`] once at startup.

use std::collections::HashSet;

use casbin::CoreApi;
use roster_core::types::Role;

use crate::error::{ServiceError, ServiceResult};

/// Casbin action used for every tier grant.
pub const TIER_ACTION: &str = "view";

/// A role-held standing checked by the visibility policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Public,
    Member,
    Board,
}

impl Tier {
    pub const ALL: [Self; 3] = [Self::Public, Self::Member, Self::Board];

    /// Returns the Casbin object string for this tier.
    #[must_use]
    pub const fn as_casbin_object(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Member => "member",
            Self::Board => "board",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_casbin_object())
    }
}

/// Immutable snapshot of which role holds which tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    grants: HashSet<(Role, Tier)>,
}

impl TierTable {
    /// The grants of the embedded default policy.
    #[must_use]
    pub fn standard() -> Self {
        let mut grants = HashSet::new();
        for role in Role::ALL {
            grants.insert((role, Tier::Public));
            if role.is_authenticated() {
                grants.insert((role, Tier::Member));
            }
        }
        grants.insert((Role::BoardMember, Tier::Board));
        grants.insert((Role::Admin, Tier::Board));
        Self { grants }
    }

    /// ## Summary
    /// Builds a table from explicit grants and validates it.
    ///
    /// ## Errors
    /// Returns `InvalidConfiguration` if the grants break a tier invariant.
    pub fn from_grants(grants: impl IntoIterator<Item = (Role, Tier)>) -> ServiceResult<Self> {
        let table = Self {
            grants: grants.into_iter().collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// ## Summary
    /// Evaluates every (role, tier) pair against a Casbin enforcer.
    ///
    /// ## Errors
    /// Returns `CasbinError` if enforcement fails, or `InvalidConfiguration`
    /// if the resulting grants break a tier invariant.
    pub fn from_enforcer(enforcer: &casbin::Enforcer) -> ServiceResult<Self> {
        let mut grants = Vec::new();

        for role in Role::ALL {
            for tier in Tier::ALL {
                let allowed = enforcer
                    .enforce((role.as_str(), tier.as_casbin_object(), TIER_ACTION))
                    .map_err(ServiceError::CasbinError)?;

                tracing::trace!(role = %role, tier = %tier, allowed, "Tier grant evaluated");

                if allowed {
                    grants.push((role, tier));
                }
            }
        }

        Self::from_grants(grants)
    }

    /// Returns `true` if `role` holds `tier`.
    #[must_use]
    pub fn holds(&self, role: Role, tier: Tier) -> bool {
        self.grants.contains(&(role, tier))
    }

    /// Number of (role, tier) grants.
    pub(crate) fn len(&self) -> usize {
        self.grants.len()
    }

    fn validate(&self) -> ServiceResult<()> {
        for role in Role::ALL {
            if !self.holds(role, Tier::Public) {
                return Err(ServiceError::InvalidConfiguration(format!(
                    "role {role} must hold the public tier"
                )));
            }
            if role.is_authenticated() && !self.holds(role, Tier::Member) {
                return Err(ServiceError::InvalidConfiguration(format!(
                    "role {role} must hold the member tier"
                )));
            }
        }

        for tier in [Tier::Member, Tier::Board] {
            if self.holds(Role::Anonymous, tier) {
                return Err(ServiceError::InvalidConfiguration(format!(
                    "anonymous requesters cannot hold the {tier} tier"
                )));
            }
        }

        if !self.holds(Role::Admin, Tier::Board) {
            return Err(ServiceError::InvalidConfiguration(
                "role admin must hold the board tier".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}
