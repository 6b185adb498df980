//! Mission route optimization entry point.
//!
//! Filters the mission's stops, optionally delegates to an external
//! solver, and otherwise runs the local nearest-neighbor + 2-opt
//! pipeline. The external solver failing only affects quality, never
//! availability: every failure path falls back to the local heuristic.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constraints::is_feasible;
use crate::external::{ExternalSolver, ExternalSolverError, SolveRequest, SolverLocation};
use crate::haversine::DistanceMatrix;
use crate::schedule::{self, OptimizedStop};
use crate::solver::{self, SolverConfig};
use crate::stop::{ClockTime, Coordinates, ParseClockTimeError, Stop, StopKind};

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("mission needs at least 2 stops with usable coordinates, found {valid}")]
    InsufficientStops { valid: usize },
    #[error("no feasible visiting order: placed {placed} of {total} stops")]
    NoFeasibleTour { placed: usize, total: usize },
    #[error("stop {stop_id} has invalid coordinates")]
    InvalidCoordinates { stop_id: String },
    #[error(transparent)]
    InvalidStartTime(#[from] ParseClockTimeError),
}

/// The vehicle's position when the mission starts.
///
/// Prepended to the stop set as a synthetic depot, so the tour begins
/// where the vehicle actually is.
#[derive(Debug, Clone, PartialEq)]
pub struct StartLocation {
    pub id: String,
    pub coordinates: Coordinates,
}

impl StartLocation {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            coordinates: Coordinates::new(latitude, longitude),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptimizeOptions {
    pub average_speed_kmh: f64,
    pub service_time_minutes: f64,
    pub start_time: ClockTime,
    pub start_location: Option<StartLocation>,
    pub solver: SolverConfig,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            average_speed_kmh: 30.0,
            service_time_minutes: 2.0,
            start_time: ClockTime::default(),
            start_location: None,
            solver: SolverConfig::default(),
        }
    }
}

impl OptimizeOptions {
    /// Set the start time from an `HH:MM` string.
    pub fn start_time_from_str(mut self, raw: &str) -> Result<Self, OptimizeError> {
        self.start_time = raw.parse()?;
        Ok(self)
    }
}

/// Which strategy produced the final ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    External,
    LocalHeuristic,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::External => f.write_str("external"),
            Strategy::LocalHeuristic => f.write_str("local-heuristic"),
        }
    }
}

/// The annotated result handed back for persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedRoute {
    pub stops: Vec<OptimizedStop>,
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
    pub strategy: Strategy,
}

/// Optimize a mission's visiting order.
///
/// Stops without usable coordinates are excluded up front. When an
/// external solver is supplied its ordering is adopted only if the
/// response is successful, covers every stop exactly once, and respects
/// precedence; anything else falls back to the local heuristic. Input
/// collections are never mutated.
pub fn optimize(
    stops: &[Stop],
    options: &OptimizeOptions,
    external: Option<&dyn ExternalSolver>,
) -> Result<OptimizedRoute, OptimizeError> {
    let (working, synthetic_start) = usable_stops(stops, options);
    if working.len() < 2 {
        return Err(OptimizeError::InsufficientStops {
            valid: working.len(),
        });
    }

    let matrix = DistanceMatrix::build(&working)?;

    if let Some(strategy) = external {
        match adopt_external_order(strategy, &working, synthetic_start, options) {
            Ok(order) => {
                info!(stops = order.len(), "adopting external solver ordering");
                return Ok(annotate(&order, &working, &matrix, options, Strategy::External));
            }
            Err(err) => {
                warn!(error = %err, "external solver unavailable, falling back to local heuristic");
            }
        }
    }

    let start_index = solver::choose_start_index(&working);
    let initial = solver::nearest_neighbor_tour(
        &working,
        &matrix,
        start_index,
        options.solver.enforce_precedence,
    );
    if initial.len() < working.len() {
        return Err(OptimizeError::NoFeasibleTour {
            placed: initial.len(),
            total: working.len(),
        });
    }

    let improved = solver::two_opt(&initial, &working, &matrix, &options.solver);
    info!(
        stops = improved.len(),
        total_km = matrix.tour_distance(&improved),
        "mission optimized with local heuristic"
    );
    Ok(annotate(
        &improved,
        &working,
        &matrix,
        options,
        Strategy::LocalHeuristic,
    ))
}

/// The optimizable stop set: synthetic start first, then every input
/// stop with valid coordinates, in input order.
fn usable_stops(stops: &[Stop], options: &OptimizeOptions) -> (Vec<Stop>, bool) {
    let mut working = Vec::with_capacity(stops.len() + 1);

    let mut synthetic_start = false;
    if let Some(start) = &options.start_location {
        if start.coordinates.is_valid() {
            working.push(Stop {
                id: start.id.clone(),
                coordinates: start.coordinates,
                kind: StopKind::Depot,
                item_ids: Vec::new(),
                time_window: None,
            });
            synthetic_start = true;
        } else {
            warn!(id = %start.id, "start location has no usable coordinates, ignoring it");
        }
    }

    working.extend(
        stops
            .iter()
            .filter(|stop| stop.coordinates.is_valid())
            .cloned(),
    );

    let dropped = stops.len() + usize::from(synthetic_start) - working.len();
    if dropped > 0 {
        warn!(dropped, "excluding stops without usable coordinates");
    }

    (working, synthetic_start)
}

fn annotate(
    order: &[usize],
    stops: &[Stop],
    matrix: &DistanceMatrix,
    options: &OptimizeOptions,
    strategy: Strategy,
) -> OptimizedRoute {
    let projected = schedule::project(order, stops, matrix, options);
    OptimizedRoute {
        stops: projected.stops,
        total_distance_km: schedule::round2(projected.total_distance_km),
        total_time_minutes: schedule::round1(projected.total_time_minutes),
        strategy,
    }
}

/// Ask the external solver for an ordering and vet it before adoption.
fn adopt_external_order(
    strategy: &dyn ExternalSolver,
    stops: &[Stop],
    synthetic_start: bool,
    options: &OptimizeOptions,
) -> Result<Vec<usize>, ExternalSolverError> {
    let to_location = |stop: &Stop| SolverLocation {
        id: stop.id.clone(),
        latitude: stop.coordinates.latitude,
        longitude: stop.coordinates.longitude,
        name: None,
    };

    let (routed, start) = if synthetic_start {
        (&stops[1..], Some(&stops[0]))
    } else {
        (stops, None)
    };

    let request = SolveRequest {
        locations: routed.iter().map(to_location).collect(),
        start_location: start.map(to_location),
        start_time: options.start_time,
        average_speed_kmh: options.average_speed_kmh,
        service_time_minutes: options.service_time_minutes,
    };

    let response = strategy.solve(&request)?;
    if !response.success {
        return Err(ExternalSolverError::Rejected(
            response
                .message
                .unwrap_or_else(|| "solver reported failure".to_string()),
        ));
    }

    let mut solved = response.optimized_stops.unwrap_or_default();
    if solved.is_empty() {
        return Err(ExternalSolverError::MalformedResponse(
            "empty stop list".to_string(),
        ));
    }
    solved.sort_by_key(|stop| stop.sequence_order);

    let index_by_id: HashMap<&str, usize> = stops
        .iter()
        .enumerate()
        .map(|(idx, stop)| (stop.id.as_str(), idx))
        .collect();

    let mut order = Vec::with_capacity(stops.len());
    let mut seen = vec![false; stops.len()];
    if synthetic_start {
        order.push(0);
        seen[0] = true;
    }

    for stop in &solved {
        let Some(&idx) = index_by_id.get(stop.id.as_str()) else {
            return Err(ExternalSolverError::MalformedResponse(format!(
                "unknown stop id {}",
                stop.id
            )));
        };
        if seen[idx] {
            return Err(ExternalSolverError::MalformedResponse(format!(
                "stop {} appears twice",
                stop.id
            )));
        }
        seen[idx] = true;
        order.push(idx);
    }

    if order.len() != stops.len() {
        return Err(ExternalSolverError::MalformedResponse(format!(
            "ordering covers {} of {} stops",
            order.len(),
            stops.len()
        )));
    }

    if options.solver.enforce_precedence && !is_feasible(&order, stops) {
        return Err(ExternalSolverError::MalformedResponse(
            "ordering violates pickup-before-dropoff".to_string(),
        ));
    }

    Ok(order)
}
