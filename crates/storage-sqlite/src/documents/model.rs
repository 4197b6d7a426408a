//! Database model for document leaves.

use diesel::prelude::*;

/// One scalar of the document tree. `value` is its JSON text.
#[derive(Queryable, Insertable, Selectable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::documents)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DocumentDB {
    pub path: String,
    pub value: String,
}
