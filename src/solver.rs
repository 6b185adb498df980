//! Local tour heuristics: constrained nearest neighbor and 2-opt.
//!
//! Construction extends greedily to the closest stop that keeps the
//! pickup-before-dropoff invariant; improvement reverses segments while
//! the total distance shrinks and the order stays feasible.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constraints::{can_deliver, is_feasible};
use crate::haversine::DistanceMatrix;
use crate::stop::{Stop, StopKind};

/// Reject reversals below this gain so float noise cannot cycle the sweep.
const MIN_IMPROVEMENT_KM: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Enforce pickup-before-dropoff. Disable for pure waypoint missions.
    pub enforce_precedence: bool,
    /// Maximum 2-opt sweeps before keeping the best order found so far.
    pub max_passes: usize,
    /// Optional wall-clock budget for the improvement phase.
    pub time_budget: Option<Duration>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            enforce_precedence: true,
            max_passes: 1000,
            time_budget: None,
        }
    }
}

/// Default tour start: a depot if present, else the first pickup, else
/// the first stop.
pub fn choose_start_index(stops: &[Stop]) -> usize {
    stops
        .iter()
        .position(|stop| stop.kind == StopKind::Depot)
        .or_else(|| stops.iter().position(|stop| stop.kind == StopKind::Pickup))
        .unwrap_or(0)
}

/// Build an initial visiting order by constrained nearest neighbor.
///
/// From the last placed stop, always extends to the closest unvisited
/// candidate; dropoffs whose items are not all picked yet are skipped.
/// Equidistant candidates resolve to the first in input order. When no
/// candidate is feasible the partial order is returned as-is; callers
/// treat a short order as an optimization failure.
pub fn nearest_neighbor_tour(
    stops: &[Stop],
    matrix: &DistanceMatrix,
    start_index: usize,
    enforce_precedence: bool,
) -> Vec<usize> {
    let n = stops.len();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    tour.push(start_index);
    visited[start_index] = true;

    let mut picked: HashSet<&str> = HashSet::new();
    if stops[start_index].kind == StopKind::Pickup {
        picked.extend(stops[start_index].item_ids.iter().map(String::as_str));
    }

    while tour.len() < n {
        let current = tour[tour.len() - 1];
        let mut best: Option<usize> = None;
        let mut best_distance = f64::INFINITY;

        for candidate in 0..n {
            if visited[candidate] {
                continue;
            }
            if enforce_precedence
                && stops[candidate].kind == StopKind::Dropoff
                && !can_deliver(&stops[candidate], &picked)
            {
                continue;
            }
            let distance = matrix.get(current, candidate);
            if distance < best_distance {
                best_distance = distance;
                best = Some(candidate);
            }
        }

        let Some(next) = best else {
            debug!(
                placed = tour.len(),
                total = n,
                "no feasible candidate left, stopping construction early"
            );
            break;
        };

        tour.push(next);
        visited[next] = true;
        if stops[next].kind == StopKind::Pickup {
            picked.extend(stops[next].item_ids.iter().map(String::as_str));
        }
    }

    tour
}

enum Sweep {
    Improved(Vec<usize>, f64),
    Converged,
    Expired,
}

/// Refine a feasible order with first-improvement 2-opt.
///
/// Each sweep scans segment reversals in a fixed (i ascending, j ascending)
/// order, accepts the first feasible reversal that strictly shortens the
/// tour, then restarts from the top. The first and last positions never
/// move. Returns an order no longer than the input; on pass or time budget
/// exhaustion the best order found so far is kept.
pub fn two_opt(
    tour: &[usize],
    stops: &[Stop],
    matrix: &DistanceMatrix,
    config: &SolverConfig,
) -> Vec<usize> {
    let mut best = tour.to_vec();
    let mut best_distance = matrix.tour_distance(&best);
    let deadline = config.time_budget.map(|budget| Instant::now() + budget);

    let mut passes = 0;
    while passes < config.max_passes {
        passes += 1;
        match sweep(&best, best_distance, stops, matrix, config, deadline) {
            Sweep::Improved(candidate, distance) => {
                best = candidate;
                best_distance = distance;
            }
            Sweep::Converged => {
                debug!(passes, total_km = best_distance, "2-opt converged");
                return best;
            }
            Sweep::Expired => {
                warn!(
                    passes,
                    total_km = best_distance,
                    "2-opt time budget exhausted, keeping best order so far"
                );
                return best;
            }
        }
    }

    warn!(
        passes,
        total_km = best_distance,
        "2-opt pass cap reached, keeping best order so far"
    );
    best
}

fn sweep(
    tour: &[usize],
    current_distance: f64,
    stops: &[Stop],
    matrix: &DistanceMatrix,
    config: &SolverConfig,
    deadline: Option<Instant>,
) -> Sweep {
    let n = tour.len();
    if n < 4 {
        return Sweep::Converged;
    }

    for i in 1..n - 1 {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Sweep::Expired;
            }
        }
        for j in i + 1..n - 1 {
            let mut candidate = tour.to_vec();
            candidate[i..=j].reverse();

            if config.enforce_precedence && !is_feasible(&candidate, stops) {
                continue;
            }

            let distance = matrix.tour_distance(&candidate);
            if distance < current_distance - MIN_IMPROVEMENT_KM {
                return Sweep::Improved(candidate, distance);
            }
        }
    }

    Sweep::Converged
}
