//! Declarative state patches
//!
//! A patch batch is produced by the external generator and looks like
//!
//! ```json
//! { "kind": "patch-v1",
//!   "changes": [ { "op": "inc", "path": "/teams/rbr/car/drag", "value": -2 } ] }
//! ```
//!
//! Operations are applied independently and in order. There is no rollback:
//! a batch that fails halfway leaves the earlier operations applied.

pub mod apply;
pub mod clamp;
pub mod path;

pub use apply::PatchApplier;
pub use clamp::AttributeClamp;
pub use path::{ensure_parent, parse_path, resolve_slot};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// One mutation. Unknown `op` values fail to decode and are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    /// Write `value`, clamped when it is a vehicle attribute
    Set {
        path: String,
        #[serde(default)]
        value: Value,
    },
    /// Add `value` (coerced to a number) to the current number
    Inc {
        path: String,
        #[serde(default)]
        value: Value,
    },
    /// Append `value` to the sequence at `path`
    Push {
        path: String,
        #[serde(default)]
        value: Value,
    },
}

impl Operation {
    pub fn set(path: impl Into<String>, value: Value) -> Self {
        Operation::Set { path: path.into(), value }
    }

    pub fn inc(path: impl Into<String>, value: Value) -> Self {
        Operation::Inc { path: path.into(), value }
    }

    pub fn push(path: impl Into<String>, value: Value) -> Self {
        Operation::Push { path: path.into(), value }
    }

    pub fn path(&self) -> &str {
        match self {
            Operation::Set { path, .. }
            | Operation::Inc { path, .. }
            | Operation::Push { path, .. } => path,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Set { .. } => "set",
            Operation::Inc { .. } => "inc",
            Operation::Push { .. } => "push",
        }
    }
}

/// Typed form of a batch, used to build batches and to publish their schema.
/// Incoming batches are decoded leniently by [`PatchApplier`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatchBatch {
    #[serde(alias = "_type")]
    pub kind: String,
    pub changes: Vec<Operation>,
}

impl PatchBatch {
    pub fn new(kind: impl Into<String>, changes: Vec<Operation>) -> Self {
        Self { kind: kind.into(), changes }
    }

    pub fn to_value(&self) -> Value {
        json!({ "kind": self.kind, "changes": self.changes })
    }
}

/// Why a batch as a whole had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFailure {
    /// Wrong tag or `changes` is not a sequence; nothing was touched
    NoOps,
    /// Well-formed batch in which no operation applied
    NoEffectiveChanges,
}

impl PatchFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchFailure::NoOps => "no-ops",
            PatchFailure::NoEffectiveChanges => "no-effective-changes",
        }
    }
}

impl fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Not a `{op, path, value}` object with a known op
    Undecodable,
    /// Path has no segments
    EmptyPath,
    /// A sequence on the path has no matching element
    Unresolvable,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Undecodable => "undecodable",
            SkipReason::EmptyPath => "empty-path",
            SkipReason::Unresolvable => "unresolvable",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedOp {
    /// Position in `changes`
    pub index: usize,
    pub path: Option<String>,
    pub reason: SkipReason,
}

/// Result of applying one batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PatchOutcome {
    /// Paths of applied operations, as written in the batch
    pub changed: Vec<String>,
    pub skipped: Vec<SkippedOp>,
    pub failure: Option<PatchFailure>,
}

impl PatchOutcome {
    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    /// Machine-readable reason string for a failed batch
    pub fn reason(&self) -> Option<&'static str> {
        self.failure.map(|f| f.as_str())
    }
}
