use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use roster_core::types::{MemberContext, Role};

use crate::db::connection::DbConnection;
use crate::db::schema::{committee_memberships, members};
use crate::error::DbResult;
use crate::model::member::MemberRow;

/// ## Summary
/// Loads a member's role and committee memberships.
///
/// ## Errors
/// Returns database errors, or a core fault if the stored role is unknown or anonymous.
#[tracing::instrument(skip(conn))]
pub async fn find_member(
    conn: &mut DbConnection<'_>,
    member_id: uuid::Uuid,
) -> DbResult<Option<MemberContext>> {
    let Some(row) = members::table
        .find(member_id)
        .select(MemberRow::as_select())
        .first::<MemberRow>(conn)
        .await
        .optional()?
    else {
        return Ok(None);
    };

    let committee_ids = committee_memberships::table
        .filter(committee_memberships::member_id.eq(member_id))
        .select(committee_memberships::committee_id)
        .load::<uuid::Uuid>(conn)
        .await?;

    tracing::trace!(
        role = %row.role,
        committee_count = committee_ids.len(),
        "Member loaded"
    );

    let role = row.role.parse::<Role>()?;
    Ok(Some(MemberContext::new(row.id, role, committee_ids)?))
}
