//! # ccsf_core - Season State Engine for the F1 ZX paddock game
//!
//! Applies declarative patch batches from an external text generator to
//! the season document, keeps the completed-round pointer moving forward
//! and rebuilds driver/constructor standings from stored race results.
//!
//! ## Features
//! - Tolerant patch application (`set` / `inc` / `push`) with vehicle
//!   attribute clamping
//! - Standings as a pure function of results, roster and points table
//! - Fuzzy team-name resolution behind a swappable trait
//! - Local saves, checksummed bundles and modular seed directories

// Doc formatting lints - purely cosmetic, fix incrementally
#![allow(clippy::doc_lazy_continuation)]

pub mod config;
pub mod engine;
pub mod error;
pub mod numeric;
pub mod patch;
pub mod reply;
pub mod sanity;
pub mod save;
pub mod season;
pub mod standings;
pub mod state;

pub use config::{EngineConfig, NewGameDefaults, ENGINE_CONFIG_PATH_ENV};
pub use engine::{BatchReport, Engine, ReplyOutcome};
pub use error::{CoreError, Result};

// Re-export patch types
pub use patch::{
    AttributeClamp, Operation, PatchApplier, PatchBatch, PatchFailure, PatchOutcome, SkipReason,
    SkippedOp,
};

// Re-export standings
pub use standings::{
    compute_standings, compute_standings_with, DriverStanding, PointsTable, Standings,
    StandingsCalculator, StrictTeamMatcher, TeamLabelResolver, TeamNameNormalizer, TeamStanding,
};

pub use reply::{parse_reply, AssistantReply};
pub use sanity::{check_and_repair, Repair};
pub use season::{advance_after_results, enforce_monotonic, next_race, NextRace, ProgressUpdate};

// Re-export save system
pub use save::{Bundle, BootSource, Booted, IntegrityIssue, SaveError, SaveStore};

// Re-export state management
pub use state::{first_run_init, CalendarEntry, GameState, Meta, Roster, Timeline};
