//! Urgency scoring.
//!
//! Every point gets a 0-100 score from its estimated fill state, how fast it
//! fills, how much waste it produces and how many people it serves. Weekends
//! and holidays boost the score because collection pauses while waste keeps
//! piling up.
//!
//! [`DeterministicUrgency`] is the formula alone. [`OracleUrgency`] asks a
//! [`ScoringOracle`] first and falls back to the formula on any failure.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::OracleError;
use crate::model::{Point, PointId};
use crate::reference::{
    ReferenceRecord, DEFAULT_DAILY_WASTE_TONS, DEFAULT_FILL_HOURS, DEFAULT_SEEDED_OCCUPANCY,
};
use crate::traits::{ReferenceSource, ScoringOracle, StateTracker, UrgencySource};

pub const FILL_WEIGHT: f64 = 0.40;
pub const FILL_RATE_WEIGHT: f64 = 0.25;
pub const WASTE_WEIGHT: f64 = 0.20;
pub const POPULATION_WEIGHT: f64 = 0.15;

/// Points taking longer than this to fill get no fill-rate credit.
pub const FILL_HOURS_HORIZON: f64 = 72.0;
pub const WASTE_SATURATION_TONS: f64 = 30.0;
pub const POPULATION_SATURATION: f64 = 30_000.0;
pub const HOLIDAY_MULTIPLIER: f64 = 1.3;

pub const MAX_SCORE: f64 = 100.0;

/// Estimated fill percentage of a point, clamped to [0, 100].
///
/// Never-collected points report their seeded occupancy instead.
pub fn fill_percent(
    last_collected: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    fill_hours: f64,
    seeded: f64,
) -> f64 {
    let Some(last_collected) = last_collected else {
        return or_default(seeded, DEFAULT_SEEDED_OCCUPANCY).clamp(0.0, 100.0);
    };

    let fill_hours = positive_or_default(fill_hours, DEFAULT_FILL_HOURS);
    let hours_since = (now - last_collected).num_seconds() as f64 / 3600.0;
    (hours_since / fill_hours * 100.0).clamp(0.0, 100.0)
}

fn or_default(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn positive_or_default(value: f64, default: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { default }
}

/// Everything a scorer may look at for one point.
#[derive(Debug, Clone, PartialEq)]
pub struct UrgencyInputs {
    pub point_id: PointId,
    pub display_name: String,
    pub fill_percent: f64,
    pub fill_hours: f64,
    pub daily_waste_tons: f64,
    pub population: u64,
    pub distance_from_depot_km: f64,
    pub non_collection_day: bool,
}

impl UrgencyInputs {
    pub fn gather(
        point: &Point,
        reference: &ReferenceRecord,
        last_collected: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        non_collection_day: bool,
    ) -> Self {
        // Unusable reference numbers take their defaults.
        let fill_hours = positive_or_default(reference.fill_hours, DEFAULT_FILL_HOURS);
        let daily_waste_tons = or_default(reference.daily_waste_tons, DEFAULT_DAILY_WASTE_TONS).max(0.0);
        let distance_from_depot_km = or_default(point.distance_from_depot_km, 0.0);

        Self {
            point_id: point.id,
            display_name: point.display_name.clone(),
            fill_percent: fill_percent(last_collected, now, fill_hours, reference.seeded_occupancy),
            fill_hours,
            daily_waste_tons,
            population: point.population_served,
            distance_from_depot_km,
            non_collection_day,
        }
    }
}

/// Weighted sum of the four clamped terms, times the holiday multiplier.
///
/// A non-finite term contributes nothing, so the result is always in
/// [0, 100].
pub fn deterministic_score(inputs: &UrgencyInputs) -> f64 {
    let fill = unit_term(inputs.fill_percent / 100.0);
    let fill_rate = unit_term(1.0 - inputs.fill_hours / FILL_HOURS_HORIZON);
    let waste = unit_term(inputs.daily_waste_tons / WASTE_SATURATION_TONS);
    let population = unit_term(inputs.population as f64 / POPULATION_SATURATION);

    let multiplier = if inputs.non_collection_day { HOLIDAY_MULTIPLIER } else { 1.0 };
    let weighted = FILL_WEIGHT * fill
        + FILL_RATE_WEIGHT * fill_rate
        + WASTE_WEIGHT * waste
        + POPULATION_WEIGHT * population;

    (weighted * MAX_SCORE * multiplier).clamp(0.0, MAX_SCORE)
}

fn unit_term(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Deterministic,
    Oracle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrgencyScore {
    pub value: f64,
    pub source: ScoreSource,
}

impl UrgencyScore {
    pub fn deterministic(inputs: &UrgencyInputs) -> Self {
        Self {
            value: deterministic_score(inputs),
            source: ScoreSource::Deterministic,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeterministicUrgency;

impl UrgencySource for DeterministicUrgency {
    fn score(&self, inputs: &UrgencyInputs) -> UrgencyScore {
        UrgencyScore::deterministic(inputs)
    }
}

/// Oracle-backed scoring with the deterministic formula as mandatory fallback.
#[derive(Debug, Clone)]
pub struct OracleUrgency<O> {
    oracle: O,
}

impl<O: ScoringOracle> OracleUrgency<O> {
    pub fn new(oracle: O) -> Self {
        Self { oracle }
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }
}

impl<O: ScoringOracle> UrgencySource for OracleUrgency<O> {
    fn score(&self, inputs: &UrgencyInputs) -> UrgencyScore {
        let prompt = render_prompt(inputs);
        match self.oracle.complete(&prompt).and_then(|reply| parse_score(&reply)) {
            Ok(value) => UrgencyScore {
                value,
                source: ScoreSource::Oracle,
            },
            Err(err @ OracleError::Http(_)) => {
                warn!(point = %inputs.point_id, error = %err, "oracle unavailable, using fallback score");
                UrgencyScore::deterministic(inputs)
            }
            Err(err) => {
                debug!(point = %inputs.point_id, error = %err, "oracle reply rejected, using fallback score");
                UrgencyScore::deterministic(inputs)
            }
        }
    }
}

/// Prompt handed to the oracle. Asks for a bare integer.
pub fn render_prompt(inputs: &UrgencyInputs) -> String {
    let holiday = if inputs.non_collection_day {
        "YES - waste accumulates faster"
    } else {
        "no"
    };

    format!(
        "You rate how urgently a waste collection point must be emptied, from 0 to 100.\n\
         \n\
         LOCATION: {name} (ID: {id})\n\
         \n\
         DATA:\n\
         - Population served: {population}\n\
         - Current fill: {fill:.1}%\n\
         - Distance from depot: {distance:.1} km\n\
         - Daily waste: {waste:.1} tons\n\
         - Hours to fill up: {hours:.1}\n\
         \n\
         NON-COLLECTION DAY (weekend/holiday): {holiday}\n\
         \n\
         RULES:\n\
         - Fill 80% or more -> 85-100\n\
         - Fill 50-80% -> 60-84\n\
         - Raise the score by 20% on non-collection days\n\
         - Favor points serving large populations\n\
         \n\
         REPLY WITH A SINGLE INTEGER BETWEEN 0 AND 100 AND NOTHING ELSE.",
        name = inputs.display_name,
        id = inputs.point_id,
        population = inputs.population,
        fill = inputs.fill_percent,
        distance = inputs.distance_from_depot_km,
        waste = inputs.daily_waste_tons,
        hours = inputs.fill_hours,
        holiday = holiday,
    )
}

/// Extract the first run of ASCII digits from an oracle reply.
pub fn parse_score(reply: &str) -> Result<f64, OracleError> {
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(OracleError::EmptyReply);
    }

    let digits: String = reply
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let value: u64 = digits
        .parse()
        .map_err(|_| OracleError::Unparseable(reply.to_string()))?;

    if value > MAX_SCORE as u64 {
        return Err(OracleError::OutOfRange(value));
    }
    Ok(value as f64)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScoredPoint {
    score: UrgencyScore,
    fill_percent: f64,
}

/// Scores and fill estimates for one planning run.
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    entries: HashMap<PointId, ScoredPoint>,
}

impl ScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score every point. Oracle calls happen one at a time, in input order.
    pub fn build(
        points: &[Point],
        source: &dyn UrgencySource,
        state: &dyn StateTracker,
        reference: &dyn ReferenceSource,
        now: DateTime<Utc>,
        non_collection_day: bool,
    ) -> Self {
        let mut board = Self::new();
        for point in points {
            let record = reference.reference_for(point.id);
            let inputs = UrgencyInputs::gather(
                point,
                &record,
                state.last_collected(point.id),
                now,
                non_collection_day,
            );
            let score = source.score(&inputs);
            debug!(
                point = %point.id,
                score = score.value,
                source = ?score.source,
                fill = inputs.fill_percent,
                "scored point"
            );
            board.insert(point.id, score, inputs.fill_percent);
        }
        board
    }

    pub fn insert(&mut self, point: PointId, score: UrgencyScore, fill_percent: f64) {
        self.entries.insert(point, ScoredPoint { score, fill_percent });
    }

    pub fn score(&self, point: PointId) -> Option<f64> {
        self.entries.get(&point).map(|entry| entry.score.value)
    }

    pub fn source(&self, point: PointId) -> Option<ScoreSource> {
        self.entries.get(&point).map(|entry| entry.score.source)
    }

    pub fn fill_percent(&self, point: PointId) -> Option<f64> {
        self.entries.get(&point).map(|entry| entry.fill_percent)
    }

    /// True if at least one score came from the oracle.
    pub fn used_oracle(&self) -> bool {
        self.entries
            .values()
            .any(|entry| entry.score.source == ScoreSource::Oracle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plain deterministic scores with unknown fill, mostly for callers that
/// already have scores in hand.
impl FromIterator<(PointId, f64)> for ScoreBoard {
    fn from_iter<I: IntoIterator<Item = (PointId, f64)>>(iter: I) -> Self {
        let mut board = Self::new();
        for (point, value) in iter {
            let score = UrgencyScore {
                value,
                source: ScoreSource::Deterministic,
            };
            board.insert(point, score, 0.0);
        }
        board
    }
}
