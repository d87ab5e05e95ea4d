//! Partial update composition.
//!
//! # Responsibility
//! - Turn a sparse patch into one `UPDATE ... RETURNING` statement.
//! - Execute it as a single round trip and decode the updated row.
//!
//! # Invariants
//! - The assignment list equals the present-field set, each column once.
//! - `updated_at` strictly increases on every update of a table that
//!   carries it, even within one clock millisecond.
//! - Current values are never read before writing.
//! - Column names come only from `PatchColumn` whitelists.

use crate::context::RequestContext;
use crate::db::NOW_MS_SQL;
use crate::error::{CoreError, CoreResult};
use crate::model::entity::Record;
use crate::model::kind::EntityId;
use crate::model::patch::{PatchColumn, SparsePatch};
use crate::store::RelationalStore;
use log::{info, warn};
use rusqlite::types::Value;
use std::collections::BTreeMap;
use std::time::Instant;

/// Composed statement, ready to bind.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    /// `?1` is the row id; assignments bind from `?2`.
    pub params: Vec<Value>,
    /// Assigned columns in binding order, `updated_at` excluded.
    pub columns: Vec<&'static str>,
}

/// Builds the update statement for `patch` against row `id`.
///
/// # Errors
/// - `EmptyUpdate` when nothing is present and the table has no `updated_at`.
pub fn compose<P: SparsePatch>(id: EntityId, patch: &P) -> CoreResult<UpdateStatement> {
    let assignments: BTreeMap<P::Column, Value> = patch.assignments().into_iter().collect();
    if assignments.is_empty() && !P::TOUCHES_UPDATED_AT {
        return Err(CoreError::EmptyUpdate(P::Output::ENTITY));
    }

    let mut set_list = Vec::with_capacity(assignments.len() + 1);
    let mut params = Vec::with_capacity(assignments.len() + 1);
    let mut columns = Vec::with_capacity(assignments.len());
    params.push(Value::from(id));
    if P::TOUCHES_UPDATED_AT {
        set_list.push(format!("updated_at = MAX({NOW_MS_SQL}, updated_at + 1)"));
    }
    for (column, value) in assignments {
        params.push(value);
        set_list.push(format!("{} = ?{}", column.as_str(), params.len()));
        columns.push(column.as_str());
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE id = ?1 RETURNING {};",
        P::Output::TABLE,
        set_list.join(", "),
        P::Output::returning_list()
    );
    Ok(UpdateStatement {
        sql,
        params,
        columns,
    })
}

/// Applies sparse patches through one store.
pub struct UpdateComposer<'s, S: RelationalStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RelationalStore + ?Sized> UpdateComposer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Updates row `id` with the present fields of `patch` and returns it.
    ///
    /// # Errors
    /// - `NotFound` when no row has this id.
    /// - `EmptyUpdate` before any round trip (see `compose`).
    /// - `ConstraintViolation` when a new foreign key does not resolve.
    pub fn apply<P: SparsePatch>(
        &self,
        ctx: &RequestContext,
        id: EntityId,
        patch: &P,
    ) -> CoreResult<P::Output> {
        let started_at = Instant::now();
        let result = compose(id, patch).and_then(|statement| {
            let row = self
                .store
                .query_optional(ctx, &statement.sql, &statement.params)?
                .ok_or_else(|| CoreError::not_found(P::Output::ENTITY, id))?;
            let updated = P::Output::from_row(&row)?;
            Ok((updated, statement.columns.len()))
        });

        match result {
            Ok((updated, column_count)) => {
                info!(
                    "event=entity_update module=update status=ok entity={} id={} columns={} request_id={} duration_ms={}",
                    P::Output::ENTITY,
                    id,
                    column_count,
                    ctx.request_id(),
                    started_at.elapsed().as_millis()
                );
                Ok(updated)
            }
            Err(err) => {
                warn!(
                    "event=entity_update module=update status=error entity={} id={} request_id={} error_code={}",
                    P::Output::ENTITY,
                    id,
                    ctx.request_id(),
                    err.code()
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::compose;
    use crate::db::NOW_MS_SQL;
    use crate::error::CoreError;
    use crate::model::kind::EntityId;
    use crate::model::patch::{FieldPatch, GoalPatch, ProjectPatch, TagPatch};
    use rusqlite::types::Value;

    fn id(value: i64) -> EntityId {
        EntityId::new(value).unwrap()
    }

    fn set_clause(sql: &str) -> &str {
        let start = sql.find(" SET ").unwrap() + " SET ".len();
        let end = sql.find(" WHERE ").unwrap();
        &sql[start..end]
    }

    #[test]
    fn assigns_exactly_the_present_fields() {
        let patch = GoalPatch {
            status: Some("done".to_string()),
            context_id: FieldPatch::Null,
            ..GoalPatch::default()
        };
        let statement = compose(id(7), &patch).unwrap();
        assert_eq!(statement.columns, vec!["status", "context_id"]);
        assert_eq!(
            statement.params,
            vec![Value::Integer(7), Value::Text("done".to_string()), Value::Null]
        );
        assert_eq!(
            set_clause(&statement.sql),
            format!(
                "updated_at = MAX({NOW_MS_SQL}, updated_at + 1), status = ?2, context_id = ?3"
            )
        );
        assert!(!set_clause(&statement.sql).contains("title"));
        assert!(statement.sql.starts_with("UPDATE goals SET "));
        assert!(statement.sql.contains(" WHERE id = ?1 RETURNING "));
    }

    #[test]
    fn empty_patch_still_touches_updated_at() {
        let statement = compose(id(1), &ProjectPatch::default()).unwrap();
        assert!(statement.columns.is_empty());
        assert_eq!(statement.params, vec![Value::Integer(1)]);
        assert_eq!(
            set_clause(&statement.sql),
            format!("updated_at = MAX({NOW_MS_SQL}, updated_at + 1)")
        );
    }

    #[test]
    fn empty_tag_patch_is_rejected() {
        assert!(matches!(
            compose(id(1), &TagPatch::default()),
            Err(CoreError::EmptyUpdate("tag"))
        ));
        let statement = compose(
            id(1),
            &TagPatch {
                color: Some("#fff".to_string()),
                ..TagPatch::default()
            },
        )
        .unwrap();
        assert_eq!(set_clause(&statement.sql), "color = ?2");
    }
}
