//! File queries and lowering of [`FileFilter`] to SQL.
//!
//! The lowering mirrors [`FileFilter::matches`] clause by clause so that a
//! listing from the database and an in-memory check agree.

use diesel::dsl::sql;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use diesel_async::RunQueryDsl;
use roster_core::filter::{FileFilter, FilterClause, ListScope, OwnershipMatch};
use roster_core::types::FileRecord;

use crate::db::connection::DbConnection;
use crate::db::schema::files;
use crate::error::DbResult;
use crate::model::file::FileRow;

/// Boxed boolean predicate over the `files` table.
pub type FilePredicate = Box<dyn BoxableExpression<files::table, Pg, SqlType = Bool>>;

/// ## Summary
/// Lowers a declarative filter to a SQL predicate.
#[must_use]
pub fn visibility_predicate(filter: &FileFilter) -> FilePredicate {
    match filter {
        FileFilter::Everything => Box::new(sql::<Bool>("TRUE")),
        FileFilter::AnyOf(clauses) => clauses
            .iter()
            .map(clause_predicate)
            .reduce(|acc, predicate| -> FilePredicate { Box::new(acc.or(predicate)) })
            .unwrap_or_else(|| -> FilePredicate { Box::new(sql::<Bool>("FALSE")) }),
    }
}

fn clause_predicate(clause: &FilterClause) -> FilePredicate {
    let mut predicate: FilePredicate = Box::new(files::visibility.eq(clause.visibility.as_str()));

    if let Some(object_types) = &clause.object_types {
        let names: Vec<&'static str> = object_types.iter().map(|t| t.as_str()).collect();
        predicate = Box::new(predicate.and(files::object_type.eq_any(names)));
    }

    // NULL owners never satisfy the comparison, matching `OwnershipMatch::matches`.
    match &clause.ownership {
        None => {}
        Some(OwnershipMatch::Member(member_id)) => {
            predicate = Box::new(
                predicate.and(files::owner_member_id.assume_not_null().eq(*member_id)),
            );
        }
        Some(OwnershipMatch::Committees(committee_ids)) => {
            predicate = Box::new(
                predicate.and(
                    files::owner_committee_id
                        .assume_not_null()
                        .eq_any(committee_ids.clone()),
                ),
            );
        }
    }

    predicate
}

/// ## Summary
/// Returns a query for the files visible through `filter`, narrowed by `scope`.
#[must_use]
pub fn visible_files(filter: &FileFilter, scope: &ListScope) -> files::BoxedQuery<'static, Pg> {
    let mut query = files::table
        .into_boxed()
        .filter(visibility_predicate(filter));

    if let Some(object_type) = scope.object_type {
        query = query.filter(files::object_type.eq(object_type.as_str()));
    }
    if let Some(visibility) = scope.visibility {
        query = query.filter(files::visibility.eq(visibility.as_str()));
    }
    if let Some(member_id) = scope.owner_member_id {
        query = query.filter(files::owner_member_id.eq(member_id));
    }
    if let Some(committee_id) = scope.owner_committee_id {
        query = query.filter(files::owner_committee_id.eq(committee_id));
    }

    query.order((files::name.asc(), files::id.asc()))
}

/// ## Summary
/// Loads a single file by ID.
///
/// ## Errors
/// Returns database errors, or a core fault if the row holds unknown enum text.
#[tracing::instrument(skip(conn))]
pub async fn find_file(
    conn: &mut DbConnection<'_>,
    file_id: uuid::Uuid,
) -> DbResult<Option<FileRecord>> {
    let row = files::table
        .find(file_id)
        .select(FileRow::as_select())
        .first::<FileRow>(conn)
        .await
        .optional()?;

    Ok(row.map(FileRecord::try_from).transpose()?)
}

/// ## Summary
/// Loads every file visible through `filter` inside `scope`.
///
/// ## Errors
/// Returns database errors, or a core fault if any row holds unknown enum text.
#[tracing::instrument(skip(conn, filter))]
pub async fn list_visible_files(
    conn: &mut DbConnection<'_>,
    filter: &FileFilter,
    scope: &ListScope,
) -> DbResult<Vec<FileRecord>> {
    tracing::debug!(clause_count = filter.clauses().len(), "Listing visible files");

    let rows = visible_files(filter, scope)
        .select(FileRow::as_select())
        .load::<FileRow>(conn)
        .await?;

    Ok(rows
        .into_iter()
        .map(FileRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}
