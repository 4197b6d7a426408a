//! Database model for per-identity preferences.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Database model for a preference key-value pair within a scope
#[derive(Queryable, Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::preferences)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDB {
    pub scope: String,
    pub pref_key: String,
    pub pref_value: String,
}
