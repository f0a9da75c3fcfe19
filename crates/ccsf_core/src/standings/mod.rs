//! Standings recomputation
//!
//! Standings are a derived view: a pure function of `stats.race_results`,
//! the roster and the points table. The cached copies in
//! `stats.driver_standings` / `stats.constructor_standings` are overwritten
//! on every recomputation and never read back as input.

pub mod calculator;
pub mod points;
pub mod results;
pub mod teams;

pub use calculator::StandingsCalculator;
pub use points::PointsTable;
pub use results::{Finisher, RaceResult};
pub use teams::{StrictTeamMatcher, TeamLabelResolver, TeamNameNormalizer};

use crate::config::EngineConfig;
use crate::numeric::serialize_compact;
use crate::state::GameState;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverStanding {
    pub driver: String,
    pub team: String,
    #[serde(serialize_with = "serialize_compact")]
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamStanding {
    pub team: String,
    #[serde(serialize_with = "serialize_compact")]
    pub points: f64,
    pub wins: u32,
    pub podiums: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Standings {
    pub drivers: Vec<DriverStanding>,
    pub teams: Vec<TeamStanding>,
}

/// Recompute standings from the document with the lenient team normalizer.
pub fn compute_standings(state: &GameState, config: &EngineConfig) -> Standings {
    let roster = state.roster();
    let teams = TeamNameNormalizer::new(&roster.team_names());
    compute_standings_with(state, config, &teams)
}

/// Recompute standings with a caller-chosen team resolver.
pub fn compute_standings_with(
    state: &GameState,
    config: &EngineConfig,
    teams: &dyn TeamLabelResolver,
) -> Standings {
    let roster = state.roster();
    let points = PointsTable::normalize_or(state.points_system(), &config.default_points);
    StandingsCalculator::new(&roster, &points, teams, &config.unattached_team)
        .calculate(&state.race_results())
}
