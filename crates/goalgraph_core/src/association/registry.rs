//! Entity kind to association storage mapping.
//!
//! # Responsibility
//! - Map `(family, kind)` to the table and columns holding the association.
//!
//! # Invariants
//! - The mapping is exhaustive over `EntityKind`; there is no fallback table.
//! - Every identifier handed out here is a `'static` literal, so nothing
//!   caller-supplied can reach SQL text through a descriptor.

use crate::error::CoreResult;
use crate::model::kind::{AsEntityKind, EntityId, EntityKind};
use rusqlite::types::Value;

/// Association families that attach to several unrelated entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationFamily {
    /// Many-to-many tags, one join table per kind.
    Tagging,
    /// One-to-many notes in one shared table keyed by kind and id.
    Notes,
}

impl AssociationFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tagging => "tagging",
            Self::Notes => "notes",
        }
    }
}

/// Physical location of one family's rows for one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub family: AssociationFamily,
    pub kind: EntityKind,
    /// Join table (tagging) or shared table (notes).
    pub table: &'static str,
    /// Column holding the owning entity id.
    pub entity_column: &'static str,
    /// Discriminator column, present only for shared tables.
    pub kind_column: Option<&'static str>,
}

impl StorageDescriptor {
    /// Predicate selecting rows owned by one entity; binds from `?1`.
    pub fn owner_predicate(&self, alias: &str) -> String {
        match self.kind_column {
            Some(kind_column) => format!(
                "{alias}.{} = ?1 AND {alias}.{kind_column} = ?2",
                self.entity_column
            ),
            None => format!("{alias}.{} = ?1", self.entity_column),
        }
    }

    /// Parameters matching `owner_predicate`, in binding order.
    pub fn owner_params(&self, entity_id: EntityId) -> Vec<Value> {
        let mut params = vec![Value::from(entity_id)];
        if self.kind_column.is_some() {
            params.push(Value::Text(self.kind.as_str().to_string()));
        }
        params
    }
}

/// Exhaustive mapping for an already parsed kind.
pub fn descriptor(family: AssociationFamily, kind: EntityKind) -> StorageDescriptor {
    match family {
        AssociationFamily::Tagging => {
            let (table, entity_column) = match kind {
                EntityKind::Project => ("project_tags", "project_id"),
                EntityKind::Goal => ("goal_tags", "goal_id"),
                EntityKind::Task => ("task_tags", "task_id"),
            };
            StorageDescriptor {
                family,
                kind,
                table,
                entity_column,
                kind_column: None,
            }
        }
        AssociationFamily::Notes => StorageDescriptor {
            family,
            kind,
            table: "notes",
            entity_column: "entity_id",
            kind_column: Some("entity_type"),
        },
    }
}

/// Parses `kind` and maps it; fails with `UnknownEntityKind` otherwise.
pub fn resolve(
    family: AssociationFamily,
    kind: impl AsEntityKind,
) -> CoreResult<StorageDescriptor> {
    Ok(descriptor(family, kind.as_entity_kind()?))
}
