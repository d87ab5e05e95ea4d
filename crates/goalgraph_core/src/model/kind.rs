//! Entity kind and identifier primitives.
//!
//! # Responsibility
//! - Parse client-supplied entity kinds into the closed `EntityKind` set.
//! - Parse client-supplied identifiers into positive `EntityId` values.
//!
//! # Invariants
//! - Kind parsing is exact and case-sensitive; nothing is trimmed.
//! - An `EntityId` is always strictly positive.

use crate::error::{CoreError, CoreResult};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Entity kinds that accept tags and notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Goal,
    Task,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Project, EntityKind::Goal, EntityKind::Task];

    /// Wire and storage literal.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Goal => "goal",
            Self::Task => "task",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "project" => Ok(Self::Project),
            "goal" => Ok(Self::Goal),
            "task" => Ok(Self::Task),
            other => Err(CoreError::UnknownEntityKind(other.to_string())),
        }
    }
}

impl FromSql for EntityKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

/// Anything that can name an entity kind: the enum itself or a raw literal.
pub trait AsEntityKind {
    fn as_entity_kind(&self) -> CoreResult<EntityKind>;
}

impl AsEntityKind for EntityKind {
    fn as_entity_kind(&self) -> CoreResult<EntityKind> {
        Ok(*self)
    }
}

impl AsEntityKind for str {
    fn as_entity_kind(&self) -> CoreResult<EntityKind> {
        self.parse()
    }
}

impl AsEntityKind for String {
    fn as_entity_kind(&self) -> CoreResult<EntityKind> {
        self.parse()
    }
}

impl<T: AsEntityKind + ?Sized> AsEntityKind for &T {
    fn as_entity_kind(&self) -> CoreResult<EntityKind> {
        (**self).as_entity_kind()
    }
}

/// Store-generated row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct EntityId(i64);

impl EntityId {
    pub fn new(value: i64) -> CoreResult<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidIdentifier(value.to_string()))
        }
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value
            .parse::<i64>()
            .map_err(|_| CoreError::InvalidIdentifier(value.to_string()))?;
        Self::new(parsed).map_err(|_| CoreError::InvalidIdentifier(value.to_string()))
    }
}

impl TryFrom<i64> for EntityId {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for i64 {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl From<EntityId> for Value {
    fn from(value: EntityId) -> Self {
        Value::Integer(value.0)
    }
}

impl FromSql for EntityId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = value.as_i64()?;
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(FromSqlError::OutOfRange(raw))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AsEntityKind, EntityId, EntityKind};
    use crate::error::CoreError;

    #[test]
    fn kind_parsing_is_exact_and_case_sensitive() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        for raw in ["Goal", "GOAL", " goal", "goal ", "widget", ""] {
            assert!(matches!(
                raw.parse::<EntityKind>(),
                Err(CoreError::UnknownEntityKind(value)) if value == raw
            ));
        }
    }

    #[test]
    fn raw_literals_resolve_through_as_entity_kind() {
        assert_eq!("task".as_entity_kind().unwrap(), EntityKind::Task);
        assert_eq!(
            "project".to_string().as_entity_kind().unwrap(),
            EntityKind::Project
        );
        assert!("flow".as_entity_kind().is_err());
    }

    #[test]
    fn identifiers_must_be_positive_integers() {
        assert_eq!("42".parse::<EntityId>().unwrap().get(), 42);
        for raw in ["0", "-3", "abc", "", "4.5", " 7"] {
            assert!(matches!(
                raw.parse::<EntityId>(),
                Err(CoreError::InvalidIdentifier(value)) if value == raw
            ));
        }
    }

    #[test]
    fn serde_uses_plain_literals() {
        assert_eq!(
            serde_json::to_string(&EntityKind::Goal).unwrap(),
            "\"goal\""
        );
        let id: EntityId = serde_json::from_str("9").unwrap();
        assert_eq!(id.get(), 9);
        assert!(serde_json::from_str::<EntityId>("0").is_err());
    }
}
