//! Schedule projection over a finalized visiting order.
//!
//! Walks the order accumulating distance and travel time at full
//! precision, charging service time once per stop after the first; the
//! vehicle starts already positioned at the first stop. Rounding happens
//! only on the reported fields.

use serde::{Deserialize, Serialize};

use crate::haversine::DistanceMatrix;
use crate::optimizer::OptimizeOptions;
use crate::stop::{ClockTime, Stop, StopKind};

/// A stop annotated with its place in the optimized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizedStop {
    pub stop_id: String,
    pub kind: StopKind,
    pub item_ids: Vec<String>,
    /// 1-based position in the visiting order.
    pub sequence_order: usize,
    /// Kilometers from the previous stop, rounded to 2 decimals.
    pub distance_from_previous_km: f64,
    /// Kilometers from the route start, rounded to 2 decimals.
    pub cumulative_distance_km: f64,
    /// Cumulative travel + service minutes, rounded to 1 decimal.
    pub travel_time_minutes: f64,
    pub estimated_arrival_time: ClockTime,
}

/// Projection result with full-precision totals.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub stops: Vec<OptimizedStop>,
    pub total_distance_km: f64,
    pub total_time_minutes: f64,
}

/// Project per-stop distances, cumulative travel time, and ETAs.
pub fn project(
    order: &[usize],
    stops: &[Stop],
    matrix: &DistanceMatrix,
    options: &OptimizeOptions,
) -> Schedule {
    let mut cumulative_km = 0.0;
    let mut cumulative_minutes = 0.0;
    let mut scheduled = Vec::with_capacity(order.len());

    for (position, &idx) in order.iter().enumerate() {
        let stop = &stops[idx];

        let from_previous = if position == 0 {
            0.0
        } else {
            matrix.get(order[position - 1], idx)
        };

        cumulative_km += from_previous;
        cumulative_minutes += from_previous / options.average_speed_kmh * 60.0;
        if position > 0 {
            cumulative_minutes += options.service_time_minutes;
        }

        scheduled.push(OptimizedStop {
            stop_id: stop.id.clone(),
            kind: stop.kind,
            item_ids: stop.item_ids.clone(),
            sequence_order: position + 1,
            distance_from_previous_km: round2(from_previous),
            cumulative_distance_km: round2(cumulative_km),
            travel_time_minutes: round1(cumulative_minutes),
            estimated_arrival_time: options.start_time.add_minutes(cumulative_minutes),
        });
    }

    Schedule {
        stops: scheduled,
        total_distance_km: cumulative_km,
        total_time_minutes: cumulative_minutes,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
