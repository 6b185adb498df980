//! Pickup-before-dropoff feasibility.
//!
//! A visiting order is feasible when every dropoff's items have all been
//! collected at pickups earlier in the order. Feasibility is a whole-tour
//! predicate: a single early delivery invalidates the entire order.

use std::collections::HashSet;

use crate::stop::{Stop, StopKind};

/// Check a visiting order against the precedence constraint.
///
/// Walks `order` left to right, accumulating picked item ids. Waypoints and
/// depots have no effect. Returns `false` on the first dropoff whose items
/// are not all picked yet.
pub fn is_feasible(order: &[usize], stops: &[Stop]) -> bool {
    let mut picked: HashSet<&str> = HashSet::new();

    for &idx in order {
        let stop = &stops[idx];
        match stop.kind {
            StopKind::Pickup => {
                picked.extend(stop.item_ids.iter().map(String::as_str));
            }
            StopKind::Dropoff => {
                if !can_deliver(stop, &picked) {
                    return false;
                }
            }
            StopKind::Waypoint | StopKind::Depot => {}
        }
    }

    true
}

/// Whether every item this stop releases has already been picked.
///
/// Subset semantics: a dropoff needing items `{a, b}` is not satisfied by
/// having picked only `{a}`.
pub(crate) fn can_deliver(stop: &Stop, picked: &HashSet<&str>) -> bool {
    stop.item_ids.iter().all(|item| picked.contains(item.as_str()))
}
