use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use log::debug;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::model::DocumentDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::documents;
use budgetbook_core::errors::Result;
use budgetbook_core::store::tree::{assemble, flatten, normalize};
use budgetbook_core::store::{
    DocumentStore, Snapshot, StoreChange, StorePath, TransactionFn, CHANGE_FEED_CAPACITY,
};

/// Document store persisting every leaf of the tree as a row.
///
/// Reads use pooled connections. Writes go through the single writer, so a
/// transaction's read and write cannot interleave with another write.
pub struct SqliteDocumentStore {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    changes: broadcast::Sender<StoreChange>,
}

impl SqliteDocumentStore {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        let (changes, _receiver) = broadcast::channel(CHANGE_FEED_CAPACITY);
        SqliteDocumentStore {
            pool,
            writer,
            changes,
        }
    }

    fn publish(&self, change: StoreChange) {
        if change.before != change.after {
            debug!("Store write at {}", change.path);
            let _ = self.changes.send(change);
        }
    }
}

type SubtreeFilter =
    Box<dyn BoxableExpression<documents::table, Sqlite, SqlType = diesel::sql_types::Bool>>;

/// `path` itself and every path below it.
fn subtree_filter(path: &StorePath) -> SubtreeFilter {
    let base = path.to_string();
    // '0' sorts right after '/', so the range holds exactly the descendants.
    let lower = format!("{}/", base);
    let upper = format!("{}0", base);
    Box::new(
        documents::path
            .eq(base)
            .or(documents::path.ge(lower).and(documents::path.lt(upper))),
    )
}

fn load_subtree(conn: &mut SqliteConnection, path: &StorePath) -> Result<Option<Value>> {
    let rows: Vec<DocumentDB> = if path.is_root() {
        documents::table
            .select(DocumentDB::as_select())
            .load(conn)
            .into_core()?
    } else {
        documents::table
            .filter(subtree_filter(path))
            .select(DocumentDB::as_select())
            .load(conn)
            .into_core()?
    };

    let mut leaves = Vec::with_capacity(rows.len());
    for row in rows {
        let value: Value = serde_json::from_str(&row.value).into_core()?;
        leaves.push((StorePath::parse(&row.path), value));
    }
    Ok(assemble(path, leaves))
}

/// Replaces the subtree at `path` with `value` and returns the change.
fn replace_subtree(
    conn: &mut SqliteConnection,
    path: &StorePath,
    value: Option<Value>,
) -> Result<StoreChange> {
    let before = load_subtree(conn, path)?;

    if path.is_root() {
        diesel::delete(documents::table).execute(conn).into_core()?;
    } else {
        diesel::delete(documents::table.filter(subtree_filter(path)))
            .execute(conn)
            .into_core()?;
    }

    if value.is_some() {
        // A scalar on the way down becomes an object.
        let mut ancestor = path.parent();
        while let Some(current) = ancestor {
            if current.is_root() {
                break;
            }
            diesel::delete(documents::table.filter(documents::path.eq(current.to_string())))
                .execute(conn)
                .into_core()?;
            ancestor = current.parent();
        }
    }

    if let Some(value) = &value {
        let rows = flatten(path, value)
            .into_iter()
            .map(|(leaf, leaf_value)| {
                Ok(DocumentDB {
                    path: leaf.to_string(),
                    value: serde_json::to_string(&leaf_value).into_core()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if !rows.is_empty() {
            diesel::insert_into(documents::table)
                .values(&rows)
                .execute(conn)
                .into_core()?;
        }
    }

    Ok(StoreChange {
        path: path.clone(),
        before,
        after: value,
    })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, path: &StorePath) -> Result<Snapshot> {
        let mut conn = get_connection(&self.pool)?;
        let value = load_subtree(&mut conn, path)?;
        Ok(Snapshot::new(path.clone(), value))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        let path_for_job = path.clone();
        let change = self
            .writer
            .exec(move |conn| replace_subtree(conn, &path_for_job, normalize(value)))
            .await?;
        self.publish(change);
        Ok(())
    }

    async fn transaction(&self, path: &StorePath, update: TransactionFn) -> Result<Snapshot> {
        let path_for_job = path.clone();
        let change = self
            .writer
            .exec(move |conn| {
                let current = load_subtree(conn, &path_for_job)?;
                let next = normalize(update(current)?);
                replace_subtree(conn, &path_for_job, next)
            })
            .await?;
        let snapshot = Snapshot::new(path.clone(), change.after.clone());
        self.publish(change);
        Ok(snapshot)
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}
