//! Assign/remove/list over the association registry.
//!
//! # Responsibility
//! - Attach and detach tags on any taggable entity kind.
//! - List tags and notes for one entity with a fixed ordering.
//!
//! # Invariants
//! - Kind resolution happens before any round trip.
//! - Assignment is idempotent; the store's uniqueness key absorbs repeats.
//! - Every operation issues exactly one round trip once the kind resolves.

use crate::association::registry::{resolve, AssociationFamily};
use crate::context::RequestContext;
use crate::error::{CoreError, CoreResult};
use crate::model::entity::{Note, Record, Tag};
use crate::model::kind::{AsEntityKind, EntityId, EntityKind};
use crate::store::RelationalStore;
use log::{debug, info, warn};
use rusqlite::types::Value;
use serde::Serialize;
use std::time::Instant;

/// Outcome of `assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TagAssignment {
    pub entity_kind: EntityKind,
    pub entity_id: EntityId,
    pub tag_id: EntityId,
    /// `false` when the pair was already assigned.
    pub newly_created: bool,
}

/// Association operations bound to one store.
pub struct AssociationResolver<'s, S: RelationalStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RelationalStore + ?Sized> AssociationResolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Assigns `tag_id` to the entity; repeating an assignment succeeds.
    ///
    /// # Errors
    /// - `UnknownEntityKind` before any round trip.
    /// - `ConstraintViolation` when the entity or the tag does not exist.
    pub fn assign(
        &self,
        ctx: &RequestContext,
        kind: impl AsEntityKind,
        entity_id: EntityId,
        tag_id: EntityId,
    ) -> CoreResult<TagAssignment> {
        let started_at = Instant::now();
        let result = resolve(AssociationFamily::Tagging, kind).and_then(|descriptor| {
            let sql = format!(
                "INSERT INTO {} ({}, tag_id) VALUES (?1, ?2) ON CONFLICT DO NOTHING;",
                descriptor.table, descriptor.entity_column
            );
            let changed = self.store.exec(
                ctx,
                &sql,
                &[Value::from(entity_id), Value::from(tag_id)],
            )?;
            Ok(TagAssignment {
                entity_kind: descriptor.kind,
                entity_id,
                tag_id,
                newly_created: changed > 0,
            })
        });
        log_write(ctx, "assoc_assign", started_at, &result, |a| a.entity_kind);
        result
    }

    /// Removes exactly the `(entity, tag)` row.
    ///
    /// # Errors
    /// - `NotFound` when the pair was not assigned.
    pub fn remove(
        &self,
        ctx: &RequestContext,
        kind: impl AsEntityKind,
        entity_id: EntityId,
        tag_id: EntityId,
    ) -> CoreResult<EntityKind> {
        let started_at = Instant::now();
        let result = resolve(AssociationFamily::Tagging, kind).and_then(|descriptor| {
            let sql = format!(
                "DELETE FROM {} WHERE {} = ?1 AND tag_id = ?2;",
                descriptor.table, descriptor.entity_column
            );
            let changed = self.store.exec(
                ctx,
                &sql,
                &[Value::from(entity_id), Value::from(tag_id)],
            )?;
            if changed == 0 {
                return Err(CoreError::not_found(
                    "tag assignment",
                    format!("{}:{entity_id}:{tag_id}", descriptor.kind),
                ));
            }
            Ok(descriptor.kind)
        });
        log_write(ctx, "assoc_remove", started_at, &result, |kind| *kind);
        result
    }

    /// Tags assigned to the entity, by name then id.
    pub fn list_tags_for(
        &self,
        ctx: &RequestContext,
        kind: impl AsEntityKind,
        entity_id: EntityId,
    ) -> CoreResult<Vec<Tag>> {
        let descriptor = resolve(AssociationFamily::Tagging, kind)?;
        let sql = format!(
            "SELECT {} FROM {} t JOIN {} a ON a.tag_id = t.id WHERE {} ORDER BY t.name ASC, t.id ASC;",
            Tag::select_list("t"),
            Tag::TABLE,
            descriptor.table,
            descriptor.owner_predicate("a")
        );
        let rows = self
            .store
            .query(ctx, &sql, &descriptor.owner_params(entity_id))?;
        let tags = rows
            .iter()
            .map(Tag::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "event=assoc_list_tags module=association status=ok kind={} request_id={} count={}",
            descriptor.kind,
            ctx.request_id(),
            tags.len()
        );
        Ok(tags)
    }

    /// Notes attached to the entity, newest first.
    pub fn list_notes_for(
        &self,
        ctx: &RequestContext,
        kind: impl AsEntityKind,
        entity_id: EntityId,
    ) -> CoreResult<Vec<Note>> {
        let descriptor = resolve(AssociationFamily::Notes, kind)?;
        let sql = format!(
            "SELECT {} FROM {} n WHERE {} ORDER BY n.created_at DESC, n.id DESC;",
            Note::select_list("n"),
            descriptor.table,
            descriptor.owner_predicate("n")
        );
        let rows = self
            .store
            .query(ctx, &sql, &descriptor.owner_params(entity_id))?;
        let notes = rows
            .iter()
            .map(Note::from_row)
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "event=assoc_list_notes module=association status=ok kind={} request_id={} count={}",
            descriptor.kind,
            ctx.request_id(),
            notes.len()
        );
        Ok(notes)
    }

    /// Attaches a new note to the entity and returns the stored row.
    ///
    /// The entity itself is not checked; notes may outlive their owner.
    pub fn attach_note(
        &self,
        ctx: &RequestContext,
        kind: impl AsEntityKind,
        entity_id: EntityId,
        title: &str,
        content: &str,
    ) -> CoreResult<Note> {
        let started_at = Instant::now();
        let result = resolve(AssociationFamily::Notes, kind).and_then(|descriptor| {
            let mut columns = vec![descriptor.entity_column];
            columns.extend(descriptor.kind_column);
            let mut params = descriptor.owner_params(entity_id);
            columns.extend(["title", "content"]);
            params.push(Value::Text(title.to_string()));
            params.push(Value::Text(content.to_string()));

            let placeholders = (1..=params.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {};",
                descriptor.table,
                columns.join(", "),
                Note::returning_list()
            );
            let row = self.store.insert_returning(ctx, &sql, &params)?;
            Ok(Note::from_row(&row)?)
        });
        log_write(ctx, "assoc_attach_note", started_at, &result, |note| {
            note.entity_type
        });
        result
    }
}

fn log_write<T>(
    ctx: &RequestContext,
    event: &str,
    started_at: Instant,
    result: &CoreResult<T>,
    kind_of: impl FnOnce(&T) -> EntityKind,
) {
    match result {
        Ok(value) => info!(
            "event={} module=association status=ok kind={} request_id={} duration_ms={}",
            event,
            kind_of(value),
            ctx.request_id(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=association status=error request_id={} duration_ms={} error_code={}",
            event,
            ctx.request_id(),
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
}
