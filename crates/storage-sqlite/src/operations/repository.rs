use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;

use autosave_core::errors::Result;
use autosave_core::operations::{NewOperation, Operation, OperationRepositoryTrait};

use super::model::{NewOperationDB, OperationDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::operations;

/// Append-only store for the operation log. Ids come from an AUTOINCREMENT
/// key, so they are never handed out twice.
pub struct OperationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl OperationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

pub(crate) fn insert_operation_in(
    conn: &mut SqliteConnection,
    new_operation: NewOperation,
) -> Result<Operation> {
    let row = diesel::insert_into(operations::table)
        .values(&NewOperationDB::from(new_operation))
        .returning(OperationDB::as_returning())
        .get_result::<OperationDB>(conn)
        .into_core()?;
    Operation::try_from(row)
}

#[async_trait]
impl OperationRepositoryTrait for OperationRepository {
    fn list(&self) -> Result<Vec<Operation>> {
        let mut conn = get_connection(&self.pool)?;
        operations::table
            .select(OperationDB::as_select())
            .order((operations::date.desc(), operations::id.desc()))
            .load::<OperationDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(Operation::try_from)
            .collect()
    }

    async fn append(&self, new_operation: NewOperation) -> Result<Operation> {
        self.writer
            .exec(move |conn| insert_operation_in(conn, new_operation))
            .await
    }
}
