use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::PreferenceDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::preferences;
use budgetbook_core::errors::Result;
use budgetbook_core::preferences::PreferenceStore;

pub struct PreferenceRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PreferenceRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PreferenceRepository { pool, writer }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    fn get_preference(&self, scope: &str, key: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        preferences::table
            .filter(preferences::scope.eq(scope))
            .filter(preferences::pref_key.eq(key))
            .select(preferences::pref_value)
            .first::<String>(&mut conn)
            .optional()
            .into_core()
    }

    async fn set_preference(&self, scope: &str, key: &str, value: &str) -> Result<()> {
        let row = PreferenceDB {
            scope: scope.to_string(),
            pref_key: key.to_string(),
            pref_value: value.to_string(),
        };

        self.writer
            .exec(move |conn| {
                diesel::replace_into(preferences::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn delete_all(&self, scope: &str) -> Result<usize> {
        let scope = scope.to_string();
        self.writer
            .exec(move |conn| {
                diesel::delete(preferences::table.filter(preferences::scope.eq(scope)))
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}
