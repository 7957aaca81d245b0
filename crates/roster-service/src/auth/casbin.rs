use casbin::{CoreApi, MgmtApi};

use crate::error::ServiceResult;

use super::tier::TierTable;

/// Casbin model for role tiers: `(role, tier, action)` with role inheritance.
pub const TIER_MODEL: &str = include_str!("tier_model.conf");

/// Policy used when no policy file is configured.
pub const DEFAULT_TIER_POLICY: &str = include_str!("tier_policy.csv");

/// ## Summary
/// Initialize a Casbin enforcer for role tiers.
///
/// Reads the CSV policy at `policy_path` when given, otherwise the embedded default policy.
///
/// ## Errors
/// Returns an error if the model or policy fails to load.
#[tracing::instrument]
pub async fn init_casbin(policy_path: Option<&str>) -> ServiceResult<casbin::Enforcer> {
    tracing::debug!("Initializing Casbin enforcer");

    let model = casbin::DefaultModel::from_str(TIER_MODEL).await?;
    tracing::debug!("Casbin model loaded");

    let enforcer = match policy_path {
        Some(path) => {
            let adapter = casbin::FileAdapter::new(path.to_owned());
            casbin::Enforcer::new(model, adapter).await?
        }
        None => {
            let adapter = string_adapter::StringAdapter::new(DEFAULT_TIER_POLICY);
            casbin::Enforcer::new(model, adapter).await?
        }
    };

    let policy_count = enforcer.get_policy().len();
    let grouping_count = enforcer.get_grouping_policy().len();
    tracing::info!(
        policy_count = policy_count,
        grouping_count = grouping_count,
        "Casbin enforcer initialized successfully"
    );
    Ok(enforcer)
}

/// ## Summary
/// Loads the tier policy and snapshots it into a validated [`TierTable`].
///
/// ## Errors
/// Returns an error if the policy fails to load or breaks a tier invariant.
pub async fn load_tier_table(policy_path: Option<&str>) -> ServiceResult<TierTable> {
    let enforcer = init_casbin(policy_path).await?;
    let table = TierTable::from_enforcer(&enforcer)?;
    tracing::info!(grant_count = table.len(), "Tier table loaded");
    Ok(table)
}
