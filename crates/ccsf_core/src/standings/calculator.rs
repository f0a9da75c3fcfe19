use super::points::PointsTable;
use super::results::RaceResult;
use super::teams::TeamLabelResolver;
use super::{DriverStanding, Standings, TeamStanding};
use crate::state::Roster;
use std::collections::HashMap;

/// Folds race results into driver and constructor standings.
///
/// Output is rebuilt from scratch on every call. Rows are ordered by points,
/// then wins, then roster order; rows outside the roster follow sorted by
/// name, so the order results were stored in never matters.
pub struct StandingsCalculator<'a> {
    roster: &'a Roster,
    points: &'a PointsTable,
    teams: &'a dyn TeamLabelResolver,
    unattached_team: &'a str,
}

struct Tally<R> {
    rows: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R> Tally<R> {
    fn new() -> Self {
        Self { rows: Vec::new(), index: HashMap::new() }
    }

    fn row(&mut self, key: &str, create: impl FnOnce() -> R) -> &mut R {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.rows.push(create());
                self.index.insert(key.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[slot]
    }
}

impl<'a> StandingsCalculator<'a> {
    pub fn new(
        roster: &'a Roster,
        points: &'a PointsTable,
        teams: &'a dyn TeamLabelResolver,
        unattached_team: &'a str,
    ) -> Self {
        Self { roster, points, teams, unattached_team }
    }

    pub fn calculate(&self, results: &[RaceResult]) -> Standings {
        let mut drivers: Tally<DriverStanding> = Tally::new();
        let mut teams: Tally<TeamStanding> = Tally::new();

        for race in results {
            let mut order: Vec<(u32, usize)> = race
                .finishers
                .iter()
                .enumerate()
                .map(|(i, f)| (f.position.unwrap_or(i as u32 + 1), i))
                .collect();
            order.sort_by_key(|&(position, _)| position);

            for (position, i) in order {
                let finisher = &race.finishers[i];
                let (driver, team) = self.identify(&finisher.driver, finisher.team.as_deref());
                let points =
                    finisher.points.or_else(|| self.points.points_for(position)).unwrap_or(0.0);
                let win = u32::from(position == 1);
                let podium = u32::from(position <= 3);

                let row = drivers.row(&driver, || DriverStanding {
                    driver: driver.clone(),
                    team: team.clone(),
                    points: 0.0,
                    wins: 0,
                    podiums: 0,
                });
                row.team = team.clone();
                row.points += points;
                row.wins += win;
                row.podiums += podium;

                let row = teams.row(&team, || TeamStanding {
                    team: team.clone(),
                    points: 0.0,
                    wins: 0,
                    podiums: 0,
                });
                row.points += points;
                row.wins += win;
                row.podiums += podium;
            }
        }

        let mut drivers = drivers.rows;
        let mut teams = teams.rows;
        let roster = self.roster;
        sort_rows(
            &mut drivers,
            |r| (r.points, r.wins),
            |r| roster.driver_position(&r.driver),
            |r| r.driver.as_str(),
        );
        sort_rows(
            &mut teams,
            |r| (r.points, r.wins),
            |r| roster.team_position(&r.team),
            |r| r.team.as_str(),
        );

        log::debug!(
            "Standings rebuilt from {} race(s): {} drivers, {} teams",
            results.len(),
            drivers.len(),
            teams.len()
        );
        Standings { drivers, teams }
    }

    /// Canonical driver name and team bucket for one finisher. The roster
    /// team wins over the result's own label.
    fn identify(&self, driver: &str, label: Option<&str>) -> (String, String) {
        match self.roster.find_driver(driver) {
            Some(known) => {
                let team = self
                    .roster
                    .team_of(known)
                    .map(|t| t.name.clone())
                    .or_else(|| known.team.as_deref().map(|t| self.teams.normalize(t)))
                    .or_else(|| label.map(|l| self.teams.normalize(l)))
                    .unwrap_or_else(|| self.unattached_team.to_string());
                (known.name.clone(), team)
            }
            None => {
                let team = label
                    .map(|l| self.teams.normalize(l))
                    .unwrap_or_else(|| self.unattached_team.to_string());
                (driver.trim().to_string(), team)
            }
        }
    }
}

/// Points desc, wins desc, then roster position. Rows outside the roster
/// come after all roster rows, ordered by case-folded name, then raw name.
fn sort_rows<R>(
    rows: &mut [R],
    score: impl Fn(&R) -> (f64, u32),
    roster_position: impl Fn(&R) -> Option<usize>,
    name: impl Fn(&R) -> &str,
) {
    rows.sort_by(|a, b| {
        let (points_a, wins_a) = score(a);
        let (points_b, wins_b) = score(b);
        let rank = |r: &R| roster_position(r).unwrap_or(usize::MAX);
        points_b
            .total_cmp(&points_a)
            .then(wins_b.cmp(&wins_a))
            .then_with(|| rank(a).cmp(&rank(b)))
            .then_with(|| name(a).to_lowercase().cmp(&name(b).to_lowercase()))
            .then_with(|| name(a).cmp(name(b)))
    });
}
