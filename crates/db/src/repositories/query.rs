//! Statement building for the generic resource repository.
//!
//! Every statement is derived from a [`ResourceDefinition`]: columns are
//! selected under their JSON names, relations become `LEFT JOIN`s whose
//! projected columns are aliased `"{relation}.{field}"` and folded into nested
//! objects after the row is read.

use campus_core::resource::{
    CREATED_AT, FieldChange, FieldDef, FieldKind, FieldValue, ListQuery, Record, RecordKey,
    ResourceDefinition, SortDirection, UPDATED_AT,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::sea_query::{
    Alias, Cond, ConditionalStatement, DeleteStatement, Expr, InsertStatement, JoinType, NullOrdering,
    Order, OrderedStatement, Query, SelectStatement, SimpleExpr, UpdateStatement,
    Value as SqlValue,
};
use serde_json::Value;

/// Alias of the resource's own table in selects.
const BASE: &str = "r";

fn base() -> Alias {
    Alias::new(BASE)
}

/// Bind value for a field, typed even when null.
pub fn field_value(field: &FieldDef, value: &FieldValue) -> SqlValue {
    match value {
        FieldValue::Null => match field.kind {
            FieldKind::Text | FieldKind::Asset => Option::<String>::None.into(),
            FieldKind::Integer => Option::<i64>::None.into(),
            FieldKind::Boolean => Option::<bool>::None.into(),
            FieldKind::Timestamp => Option::<DateTime<Utc>>::None.into(),
            FieldKind::Date => Option::<NaiveDate>::None.into(),
        },
        FieldValue::Text(s) => s.clone().into(),
        FieldValue::Integer(n) => (*n).into(),
        FieldValue::Boolean(b) => (*b).into(),
        FieldValue::Timestamp(ts) => (*ts).into(),
        FieldValue::Date(d) => (*d).into(),
    }
}

/// Bind value for a key.
pub fn key_value(key: &RecordKey) -> SqlValue {
    match key {
        RecordKey::Integer(n) => (*n).into(),
        RecordKey::Text(s) => s.clone().into(),
    }
}

/// `SELECT` with every column, relation projections, and default ordering.
pub fn select(def: &ResourceDefinition) -> SelectStatement {
    let mut stmt = Query::select();
    stmt.from_as(Alias::new(def.table), base());

    stmt.expr_as(
        Expr::col((base(), Alias::new(def.key.column))),
        Alias::new(def.key.name),
    );
    for field in def.fields {
        stmt.expr_as(
            Expr::col((base(), Alias::new(field.column))),
            Alias::new(field.name),
        );
    }
    for name in [CREATED_AT, UPDATED_AT] {
        if let Some(column) = def.column_of(name) {
            stmt.expr_as(Expr::col((base(), Alias::new(column))), Alias::new(name));
        }
    }

    for relation in def.relations {
        let Some(fk) = def.column_of(relation.field) else {
            continue;
        };
        let joined = Alias::new(relation.name);
        stmt.join_as(
            JoinType::LeftJoin,
            Alias::new(relation.target.table),
            joined.clone(),
            Expr::col((joined.clone(), Alias::new(relation.target.key.column)))
                .equals((base(), Alias::new(fk))),
        );
        for name in relation.projection {
            if let Some(column) = relation.target.column_of(name) {
                stmt.expr_as(
                    Expr::col((joined.clone(), Alias::new(column))),
                    Alias::new(format!("{}.{name}", relation.name)),
                );
            }
        }
    }

    for order in def.order {
        if let Some(column) = def.column_of(order.field) {
            let direction = match order.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            stmt.order_by_with_nulls((base(), Alias::new(column)), direction, NullOrdering::Last);
        }
    }
    stmt.order_by((base(), Alias::new(def.key.column)), Order::Asc);

    stmt
}

/// `SELECT` restricted by list filters and limit.
pub fn select_list(def: &ResourceDefinition, query: &ListQuery) -> SelectStatement {
    let mut stmt = select(def);
    for filter in &query.filters {
        stmt.and_where(
            Expr::col((base(), Alias::new(filter.field.column)))
                .eq(field_value(filter.field, &filter.value)),
        );
    }
    if let Some(limit) = query.limit {
        stmt.limit(limit);
    }
    stmt
}

/// `SELECT` of a single record.
pub fn select_one(def: &ResourceDefinition, key: &RecordKey) -> SelectStatement {
    let mut stmt = select(def);
    stmt.and_where(Expr::col((base(), Alias::new(def.key.column))).eq(key_value(key)));
    stmt
}

/// `SELECT key ... LIMIT 1` of a record whose asset columns hold any of
/// `references`. `None` when the resource has no asset fields.
pub fn select_referencing(
    def: &ResourceDefinition,
    references: &[String],
) -> Option<SelectStatement> {
    let mut any = Cond::any();
    let mut columns = 0;
    for field in def.fields.iter().filter(|f| f.kind == FieldKind::Asset) {
        any = any.add(Expr::col(Alias::new(field.column)).is_in(references.iter().cloned()));
        columns += 1;
    }
    if columns == 0 || references.is_empty() {
        return None;
    }

    let mut stmt = Query::select();
    stmt.column(Alias::new(def.key.column))
        .from(Alias::new(def.table))
        .cond_where(any)
        .limit(1);
    Some(stmt)
}

/// `INSERT ... RETURNING key`.
///
/// # Errors
///
/// Returns the builder's message if the column and value lists disagree.
pub fn insert(
    def: &ResourceDefinition,
    key: Option<&RecordKey>,
    changes: &[FieldChange],
) -> Result<InsertStatement, String> {
    let mut columns = Vec::with_capacity(changes.len() + 1);
    let mut values: Vec<SimpleExpr> = Vec::with_capacity(changes.len() + 1);

    if let Some(key) = key {
        columns.push(Alias::new(def.key.column));
        values.push(key_value(key).into());
    }
    for change in changes {
        columns.push(Alias::new(change.field.column));
        values.push(field_value(change.field, &change.value).into());
    }

    let mut stmt = Query::insert();
    stmt.into_table(Alias::new(def.table));
    if columns.is_empty() {
        stmt.or_default_values();
    } else {
        stmt.columns(columns);
        stmt.values(values).map_err(|e| e.to_string())?;
    }
    stmt.returning_col(Alias::new(def.key.column));

    Ok(stmt)
}

/// `UPDATE` of the changed columns, bumping `updated_at`.
pub fn update(def: &ResourceDefinition, key: &RecordKey, changes: &[FieldChange]) -> UpdateStatement {
    let mut stmt = Query::update();
    stmt.table(Alias::new(def.table));
    for change in changes {
        stmt.value(
            Alias::new(change.field.column),
            field_value(change.field, &change.value),
        );
    }
    stmt.value(Alias::new("updated_at"), Expr::current_timestamp());
    stmt.and_where(Expr::col(Alias::new(def.key.column)).eq(key_value(key)));
    stmt
}

/// `DELETE` of one record.
pub fn delete(def: &ResourceDefinition, key: &RecordKey) -> DeleteStatement {
    let mut stmt = Query::delete();
    stmt.from_table(Alias::new(def.table))
        .and_where(Expr::col(Alias::new(def.key.column)).eq(key_value(key)));
    stmt
}

/// Turn a flat result row into a record with nested relation objects.
///
/// A relation whose projected columns are all null (no foreign key, or a
/// dangling one) becomes `null`.
pub fn fold_row(def: &ResourceDefinition, row: Value) -> Record {
    let Value::Object(mut record) = row else {
        return Record::new();
    };

    for relation in def.relations {
        let nested: Record = relation
            .projection
            .iter()
            .map(|name| {
                let value = record
                    .remove(&format!("{}.{name}", relation.name))
                    .unwrap_or(Value::Null);
                ((*name).to_string(), value)
            })
            .collect();

        let value = if nested.values().all(Value::is_null) {
            Value::Null
        } else {
            Value::Object(nested)
        };
        record.insert(relation.name.to_string(), value);
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::catalog::{DEPARTMENT, FACULTY, NEWS, PROGRAM, PUBLICATION};
    use campus_core::resource::Filter;
    use sea_orm::sea_query::{PostgresQueryBuilder, QueryStatementWriter};
    use serde_json::json;

    #[test]
    fn test_select_aliases_columns_to_json_names() {
        let sql = select(&DEPARTMENT).to_string(PostgresQueryBuilder);
        assert_eq!(
            sql,
            r#"SELECT "r"."id" AS "id", "r"."name" AS "name", "r"."code" AS "code", "r"."description" AS "description", "r"."created_at" AS "createdAt", "r"."updated_at" AS "updatedAt" FROM "departments" AS "r" ORDER BY "r"."name" ASC NULLS LAST, "r"."id" ASC"#
        );
    }

    #[test]
    fn test_select_joins_relation_projection() {
        let sql = select(&PROGRAM).to_string(PostgresQueryBuilder);
        assert!(sql.contains(
            r#"LEFT JOIN "departments" AS "department" ON "department"."id" = "r"."department_id""#
        ));
        assert!(sql.contains(r#""department"."code" AS "department.code""#));
        assert!(sql.contains(r#""r"."duration_years" AS "durationYears""#));
    }

    #[test]
    fn test_select_orders_with_key_tie_breaker() {
        let sql = select(&PUBLICATION).to_string(PostgresQueryBuilder);
        assert!(sql.ends_with(
            r#"ORDER BY "r"."year" DESC NULLS LAST, "r"."sequence" ASC NULLS LAST, "r"."id" ASC"#
        ));
    }

    #[test]
    fn test_select_list_filters_and_limit() {
        let query = ListQuery {
            filters: vec![Filter {
                field: NEWS.field("highlighted").unwrap(),
                value: FieldValue::Boolean(true),
            }],
            limit: Some(5),
        };
        let sql = select_list(&NEWS, &query).to_string(PostgresQueryBuilder);
        assert!(sql.contains(r#"WHERE "r"."highlighted" = TRUE"#));
        assert!(sql.contains(r#""r"."published_at" DESC NULLS LAST"#));
        assert!(sql.ends_with("LIMIT 5"));
    }

    #[test]
    fn test_select_referencing_checks_every_asset_column() {
        let references = vec![
            "documents/a.pdf".to_string(),
            "https://assets.test/documents/a.pdf".to_string(),
        ];
        let sql = select_referencing(&PUBLICATION, &references)
            .expect("publications store documents")
            .to_string(PostgresQueryBuilder);
        assert_eq!(
            sql,
            r#"SELECT "id" FROM "publications" WHERE "document_url" IN ('documents/a.pdf', 'https://assets.test/documents/a.pdf') LIMIT 1"#
        );
    }

    #[test]
    fn test_select_referencing_skips_resources_without_assets() {
        let references = vec!["faculty/a.jpg".to_string()];
        assert!(select_referencing(&DEPARTMENT, &references).is_none());
        assert!(select_referencing(&FACULTY, &[]).is_none());
    }

    #[test]
    fn test_insert_returns_key() {
        let changes = [FieldChange {
            field: DEPARTMENT.field("name").unwrap(),
            value: FieldValue::Text("Physics".into()),
        }];
        let sql = insert(&DEPARTMENT, None, &changes)
            .unwrap()
            .to_string(PostgresQueryBuilder);
        assert_eq!(
            sql,
            r#"INSERT INTO "departments" ("name") VALUES ('Physics') RETURNING "id""#
        );
    }

    #[test]
    fn test_insert_text_key() {
        let key = RecordKey::Text("dr-rao".into());
        let changes = [FieldChange {
            field: FACULTY.field("isHead").unwrap(),
            value: FieldValue::Boolean(false),
        }];
        let sql = insert(&FACULTY, Some(&key), &changes)
            .unwrap()
            .to_string(PostgresQueryBuilder);
        assert!(sql.starts_with(r#"INSERT INTO "faculty" ("id", "is_head") VALUES ('dr-rao', FALSE)"#));
    }

    #[test]
    fn test_update_sets_null_and_timestamp() {
        let changes = [FieldChange {
            field: PROGRAM.field("brochureUrl").unwrap(),
            value: FieldValue::Null,
        }];
        let sql = update(&PROGRAM, &RecordKey::Integer(3), &changes).to_string(PostgresQueryBuilder);
        assert!(sql.starts_with(r#"UPDATE "programs" SET "brochure_url" = NULL, "updated_at" = CURRENT_TIMESTAMP"#));
        assert!(sql.ends_with(r#"WHERE "id" = 3"#));
    }

    #[test]
    fn test_delete_by_key() {
        let sql = delete(&FACULTY, &RecordKey::Text("dr-rao".into())).to_string(PostgresQueryBuilder);
        assert_eq!(sql, r#"DELETE FROM "faculty" WHERE "id" = 'dr-rao'"#);
    }

    #[test]
    fn test_fold_row_nests_relations() {
        let row = json!({
            "id": 1,
            "name": "B.Sc Physics",
            "department.id": 2,
            "department.name": "Physics",
            "department.code": null
        });
        let record = fold_row(&PROGRAM, row);
        assert_eq!(
            record["department"],
            json!({"id": 2, "name": "Physics", "code": null})
        );
        assert!(!record.contains_key("department.id"));
    }

    #[test]
    fn test_fold_row_missing_relation_is_null() {
        let row = json!({
            "id": "dr-rao",
            "department.id": null,
            "department.name": null
        });
        let record = fold_row(&FACULTY, row);
        assert_eq!(record["department"], Value::Null);
    }
}
