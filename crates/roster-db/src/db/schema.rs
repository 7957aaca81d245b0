// Mirrors migrations/2026-01-01-000000_create_files.

diesel::table! {
    files (id) {
        id -> Uuid,
        name -> Text,
        object_type -> Text,
        visibility -> Text,
        owner_member_id -> Nullable<Uuid>,
        owner_committee_id -> Nullable<Uuid>,
    }
}

diesel::table! {
    members (id) {
        id -> Uuid,
        role -> Text,
    }
}

diesel::table! {
    committee_memberships (member_id, committee_id) {
        member_id -> Uuid,
        committee_id -> Uuid,
    }
}

diesel::joinable!(committee_memberships -> members (member_id));

diesel::allow_tables_to_appear_in_same_query!(files, members, committee_memberships);
