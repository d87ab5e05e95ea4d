//! Selectable field names per expandable entity.
//!
//! Names are the client-facing ones; `flow` is accepted wherever `context` is.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GoalField {
    Project,
    Context,
    Tasks,
    Tags,
    Notes,
}

impl GoalField {
    pub const ALL: [GoalField; 5] = [
        Self::Project,
        Self::Context,
        Self::Tasks,
        Self::Tags,
        Self::Notes,
    ];
}

impl FromStr for GoalField {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "project" => Ok(Self::Project),
            "context" | "flow" => Ok(Self::Context),
            "tasks" => Ok(Self::Tasks),
            "tags" => Ok(Self::Tags),
            "notes" => Ok(Self::Notes),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProjectField {
    Workspace,
    Goals,
    Tasks,
    Tags,
    Notes,
}

impl ProjectField {
    pub const ALL: [ProjectField; 5] = [
        Self::Workspace,
        Self::Goals,
        Self::Tasks,
        Self::Tags,
        Self::Notes,
    ];
}

impl FromStr for ProjectField {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "workspace" => Ok(Self::Workspace),
            "goals" => Ok(Self::Goals),
            "tasks" => Ok(Self::Tasks),
            "tags" => Ok(Self::Tags),
            "notes" => Ok(Self::Notes),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskField {
    Goal,
    Project,
    Context,
    Tags,
    Notes,
}

impl TaskField {
    pub const ALL: [TaskField; 5] = [
        Self::Goal,
        Self::Project,
        Self::Context,
        Self::Tags,
        Self::Notes,
    ];
}

impl FromStr for TaskField {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "goal" => Ok(Self::Goal),
            "project" => Ok(Self::Project),
            "context" | "flow" => Ok(Self::Context),
            "tags" => Ok(Self::Tags),
            "notes" => Ok(Self::Notes),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextField {
    Parent,
    Children,
}

impl FromStr for ContextField {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "parent" => Ok(Self::Parent),
            "children" => Ok(Self::Children),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagField {
    Parent,
    Children,
}

impl FromStr for TagField {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "parent" => Ok(Self::Parent),
            "children" => Ok(Self::Children),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

/// Parses client field names into a duplicate-free selection.
///
/// Fails on the first unknown name; `flow` and `context` collapse into one
/// entry.
pub fn parse_selection<F, I>(names: I) -> CoreResult<BTreeSet<F>>
where
    F: FromStr<Err = CoreError> + Ord,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().parse::<F>())
        .collect()
}
