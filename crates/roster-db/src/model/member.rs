use diesel::{pg::Pg, prelude::*};

use crate::db::schema;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::members)]
#[diesel(check_for_backend(Pg))]
pub struct MemberRow {
    pub id: uuid::Uuid,
    pub role: String,
}
