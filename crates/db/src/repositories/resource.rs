//! Resource repository for database operations.
//!
//! One repository serves every declared resource type; statements are built
//! from the definition by [`super::query`].

use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, JsonValue, SqlErr,
};
use tracing::debug;

use campus_core::resource::{
    FieldChange, KeyKind, ListQuery, Record, RecordKey, ResourceDefinition, ResourceError,
    ResourceRepository as ResourceRepoTrait,
};

use super::query;

/// Resource repository implementation.
#[derive(Debug)]
pub struct ResourceRepository {
    db: DatabaseConnection,
}

impl ResourceRepository {
    /// Create a new resource repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }
}

/// Map a database error, turning constraint violations into caller errors.
fn map_db_err(def: &ResourceDefinition, err: DbErr) -> ResourceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ResourceError::validation(format!(
            "{} conflicts with an existing record",
            def.name
        )),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ResourceError::validation(format!(
            "{} references a missing record or is still referenced",
            def.name
        )),
        _ => ResourceError::repository(err.to_string()),
    }
}

impl ResourceRepoTrait for ResourceRepository {
    async fn list(
        &self,
        def: &'static ResourceDefinition,
        query: &ListQuery,
    ) -> Result<Vec<Record>, ResourceError> {
        let stmt = self.backend().build(&query::select_list(def, query));
        debug!(resource = def.name, sql = %stmt, "Listing records");

        let rows = JsonValue::find_by_statement(stmt)
            .all(&self.db)
            .await
            .map_err(|e| map_db_err(def, e))?;

        Ok(rows.into_iter().map(|row| query::fold_row(def, row)).collect())
    }

    async fn find(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> Result<Option<Record>, ResourceError> {
        let stmt = self.backend().build(&query::select_one(def, key));

        let row = JsonValue::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| map_db_err(def, e))?;

        Ok(row.map(|row| query::fold_row(def, row)))
    }

    async fn insert(
        &self,
        def: &'static ResourceDefinition,
        key: Option<RecordKey>,
        changes: &[FieldChange],
    ) -> Result<RecordKey, ResourceError> {
        let stmt = query::insert(def, key.as_ref(), changes).map_err(ResourceError::repository)?;

        let row = self
            .db
            .query_one(self.backend().build(&stmt))
            .await
            .map_err(|e| map_db_err(def, e))?
            .ok_or_else(|| ResourceError::repository("insert returned no row"))?;

        let key = match def.key.kind {
            KeyKind::Integer => row.try_get::<i64>("", def.key.column).map(RecordKey::Integer),
            KeyKind::Text => row.try_get::<String>("", def.key.column).map(RecordKey::Text),
        }
        .map_err(|e| ResourceError::repository(e.to_string()))?;

        Ok(key)
    }

    async fn update(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
        changes: &[FieldChange],
    ) -> Result<bool, ResourceError> {
        let stmt = self.backend().build(&query::update(def, key, changes));

        let result = self
            .db
            .execute(stmt)
            .await
            .map_err(|e| map_db_err(def, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(
        &self,
        def: &'static ResourceDefinition,
        key: &RecordKey,
    ) -> Result<bool, ResourceError> {
        let stmt = self.backend().build(&query::delete(def, key));

        let result = self
            .db
            .execute(stmt)
            .await
            .map_err(|e| map_db_err(def, e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_asset_referenced(
        &self,
        defs: &[&'static ResourceDefinition],
        references: &[String],
    ) -> Result<bool, ResourceError> {
        for def in defs {
            let Some(stmt) = query::select_referencing(def, references) else {
                continue;
            };

            let row = self
                .db
                .query_one(self.backend().build(&stmt))
                .await
                .map_err(|e| map_db_err(def, e))?;
            if row.is_some() {
                debug!(resource = def.name, "Asset still referenced");
                return Ok(true);
            }
        }
        Ok(false)
    }
}
