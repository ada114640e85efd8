//! LineupOptimizer: 포메이션 규칙 안에서 최대 득점 선발 11명 계산
//!
//! Substitutions are only legal within a position, so for a fixed shape the best pick per
//! position is simply its top-k players by points. The optimizer ranks each position once and
//! evaluates every legal shape (at most 3x3x3 before filtering, 7 under the standard rules).

use crate::config::FormationRules;
use crate::error::{ConfigError, LineupError, Requirement, Result, Shortfall};
use crate::models::{
    Formation, OptimalResult, PlayerId, PlayerRecord, Position, PositionPoints, RosterSnapshot,
};
use std::cmp::{Ordering, Reverse};
use tracing::debug;


#[derive(Debug, Clone, Copy, Default)]
pub struct LineupOptimizer {
    rules: FormationRules,
}

/// Players of one roster grouped by position, best first.
struct RankedRoster<'a> {
    by_position: [Vec<&'a PlayerRecord>; 4],
}

impl<'a> RankedRoster<'a> {
    fn new(roster: &'a RosterSnapshot) -> Self {
        let mut by_position: [Vec<&PlayerRecord>; 4] = Default::default();
        for player in roster.players() {
            by_position[player.position.index()].push(player);
        }
        for players in by_position.iter_mut() {
            // points desc, then lower squad slot, then id for full determinism
            players.sort_by_key(|p| (Reverse(p.points), p.squad_slot, p.id));
        }
        Self { by_position }
    }

    fn ranked(&self, position: Position) -> &[&'a PlayerRecord] {
        &self.by_position[position.index()]
    }

    fn available(&self, position: Position) -> usize {
        self.ranked(position).len()
    }

    fn top(&self, position: Position, count: u8) -> &[&'a PlayerRecord] {
        &self.ranked(position)[..count as usize]
    }
}

/// One evaluated shape.
struct Candidate<'a> {
    formation: Formation,
    total: i64,
    selected: Vec<&'a PlayerRecord>,
    /// Ascending squad slots of `selected`, for the last tie-break.
    slots: Vec<u8>,
}

impl Candidate<'_> {
    /// Higher total wins; exact ties go to more defenders, then more midfielders, then the
    /// lexicographically earliest squad slots.
    fn cmp_preference(&self, other: &Self) -> Ordering {
        self.total
            .cmp(&other.total)
            .then(self.formation.defenders.cmp(&other.formation.defenders))
            .then(self.formation.midfielders.cmp(&other.formation.midfielders))
            .then_with(|| other.slots.cmp(&self.slots))
    }
}

impl LineupOptimizer {
    pub fn new(rules: FormationRules) -> std::result::Result<Self, ConfigError> {
        rules.validate()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &FormationRules {
        &self.rules
    }

    /// Maximum-points legal starting eleven for `roster`.
    pub fn optimal_lineup(&self, roster: &RosterSnapshot) -> Result<OptimalResult> {
        if roster.is_empty() {
            return Err(LineupError::EmptyRoster {
                manager_id: roster.manager_id().clone(),
                period: roster.period(),
            });
        }

        let ranked = RankedRoster::new(roster);
        self.check_floors(roster, &ranked)?;

        let mut best: Option<Candidate> = None;
        let mut evaluated = 0usize;
        for formation in self.rules.shapes() {
            let Some(candidate) = Self::evaluate(&ranked, formation) else {
                continue;
            };
            evaluated += 1;
            let replace = match &best {
                Some(current) => candidate.cmp_preference(current) == Ordering::Greater,
                None => true,
            };
            if replace {
                best = Some(candidate);
            }
        }

        let Some(best) = best else {
            return Err(self.outfield_shortfall(roster, &ranked));
        };

        debug!(
            "Optimal lineup for {}/{}: {} with {} pts ({} shapes evaluated)",
            roster.manager_id(),
            roster.period(),
            best.formation,
            best.total,
            evaluated
        );

        Ok(Self::into_result(roster, best))
    }

    fn check_floors(&self, roster: &RosterSnapshot, ranked: &RankedRoster) -> Result<()> {
        let mut shortfalls = Vec::new();

        for position in Position::ALL {
            let needed = self.rules.range(position).min as usize;
            let available = ranked.available(position);
            if available < needed {
                shortfalls.push(Shortfall {
                    requirement: Requirement::Position(position),
                    available,
                    needed,
                });
            }
        }

        let starters = self.rules.starters as usize;
        if roster.len() < starters {
            shortfalls.push(Shortfall {
                requirement: Requirement::TotalPlayers,
                available: roster.len(),
                needed: starters,
            });
        }

        if shortfalls.is_empty() {
            Ok(())
        } else {
            Err(LineupError::InsufficientRoster {
                manager_id: roster.manager_id().clone(),
                period: roster.period(),
                shortfalls,
            })
        }
    }

    /// Floors and head count are met but the per-position maxima cap the usable outfield
    /// players below the number of outfield slots (e.g. four goalkeepers in the squad).
    fn outfield_shortfall(&self, roster: &RosterSnapshot, ranked: &RankedRoster) -> LineupError {
        let usable: usize = Position::OUTFIELD
            .iter()
            .map(|&position| ranked.available(position).min(self.rules.range(position).max as usize))
            .sum();

        LineupError::InsufficientRoster {
            manager_id: roster.manager_id().clone(),
            period: roster.period(),
            shortfalls: vec![Shortfall {
                requirement: Requirement::OutfieldPlayers,
                available: usable,
                needed: self.rules.outfield_slots() as usize,
            }],
        }
    }

    fn evaluate<'a>(ranked: &RankedRoster<'a>, formation: Formation) -> Option<Candidate<'a>> {
        let fits = Position::ALL
            .iter()
            .all(|&position| ranked.available(position) >= formation.count(position) as usize);
        if !fits {
            return None;
        }

        let selected: Vec<&PlayerRecord> = Position::ALL
            .iter()
            .flat_map(|&position| ranked.top(position, formation.count(position)).iter().copied())
            .collect();
        let total = selected.iter().map(|p| i64::from(p.points)).sum();
        let mut slots: Vec<u8> = selected.iter().map(|p| p.squad_slot).collect();
        slots.sort_unstable();

        Some(Candidate { formation, total, selected, slots })
    }

    fn into_result(roster: &RosterSnapshot, best: Candidate) -> OptimalResult {
        let mut points_by_position = PositionPoints::default();
        for player in &best.selected {
            points_by_position.add(player.position, player.points);
        }

        let starters: Vec<PlayerId> = best.selected.iter().map(|p| p.id).collect();
        let bench = roster
            .players()
            .iter()
            .map(|p| p.id)
            .filter(|id| !starters.contains(id))
            .collect();

        OptimalResult {
            manager_id: roster.manager_id().clone(),
            period: roster.period(),
            formation: best.formation,
            total_points: best.total,
            starters,
            bench,
            points_by_position,
        }
    }
}

/// [`LineupOptimizer::optimal_lineup`] under the standard rules.
pub fn optimal_lineup(roster: &RosterSnapshot) -> Result<OptimalResult> {
    LineupOptimizer::default().optimal_lineup(roster)
}
