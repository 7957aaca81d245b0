use diesel::{pg::Pg, prelude::*};
use roster_core::error::CoreError;
use roster_core::types::FileRecord;

use crate::db::schema;

/// Raw `files` row. Enum columns stay as text until converted.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::files)]
#[diesel(check_for_backend(Pg))]
pub struct FileRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub object_type: String,
    pub visibility: String,
    pub owner_member_id: Option<uuid::Uuid>,
    pub owner_committee_id: Option<uuid::Uuid>,
}

impl TryFrom<FileRow> for FileRecord {
    type Error = CoreError;

    fn try_from(row: FileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            object_type: row.object_type.parse()?,
            visibility: row.visibility.parse()?,
            owner_member_id: row.owner_member_id,
            owner_committee_id: row.owner_committee_id,
        })
    }
}
