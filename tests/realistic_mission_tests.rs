//! Realistic mission tests using real Lyon-area locations.
//!
//! These exercise the full pipeline (filtering, construction,
//! improvement, projection) at the stop counts and coordinate spreads
//! production missions actually have.

mod fixtures;

use mission_planner::constraints::is_feasible;
use mission_planner::haversine::DistanceMatrix;
use mission_planner::optimizer::{OptimizeOptions, OptimizedRoute, StartLocation, optimize};
use mission_planner::solver::{SolverConfig, two_opt};
use mission_planner::stop::{Stop, StopKind};

use fixtures::lyon_sites::{DEPOTS, SHOPS, Site, WAREHOUSES};

// ============================================================================
// Mission Builders
// ============================================================================

fn stop_at(site: &Site, kind: StopKind) -> Stop {
    Stop::new(site.name, site.lat, site.lng, kind)
}

/// A delivery round: one depot, three supplier pickups, six shop dropoffs.
fn delivery_round() -> Vec<Stop> {
    let mut stops = vec![stop_at(&DEPOTS[0], StopKind::Depot)];

    for (i, warehouse) in WAREHOUSES.iter().take(3).enumerate() {
        stops.push(
            stop_at(warehouse, StopKind::Pickup).with_items([format!("lot-{i}a"), format!("lot-{i}b")]),
        );
    }
    for (i, shop) in SHOPS.iter().take(6).enumerate() {
        let lot = format!("lot-{}{}", i % 3, if i < 3 { "a" } else { "b" });
        stops.push(stop_at(shop, StopKind::Dropoff).with_items([lot]));
    }

    stops
}

fn order_of(route: &OptimizedRoute, stops: &[Stop]) -> Vec<usize> {
    route
        .stops
        .iter()
        .map(|scheduled| {
            stops
                .iter()
                .position(|stop| stop.id == scheduled.stop_id)
                .expect("scheduled stop comes from the input set")
        })
        .collect()
}

// ============================================================================
// Full Pipeline
// ============================================================================

#[test]
fn test_delivery_round_is_fully_planned() {
    let stops = delivery_round();
    let route = optimize(&stops, &OptimizeOptions::default(), None).expect("optimize");

    assert_eq!(route.stops.len(), stops.len());
    assert_eq!(route.stops[0].stop_id, DEPOTS[0].name, "starts at the depot");

    let order = order_of(&route, &stops);
    assert!(is_feasible(&order, &stops), "every dropoff after its pickups");

    // Lyon city missions come in well under a 100 km round.
    assert!(route.total_distance_km > 5.0);
    assert!(route.total_distance_km < 100.0);
}

#[test]
fn test_etas_advance_along_the_round() {
    let stops = delivery_round();
    let options = OptimizeOptions::default()
        .start_time_from_str("06:30")
        .expect("start time");
    let route = optimize(&stops, &options, None).expect("optimize");

    assert_eq!(route.stops[0].estimated_arrival_time.to_string(), "06:30");
    for pair in route.stops.windows(2) {
        assert!(
            pair[1].travel_time_minutes > pair[0].travel_time_minutes,
            "travel time accumulates between distinct sites"
        );
    }
}

#[test]
fn test_service_time_inflates_total_duration() {
    let stops = delivery_round();
    let quick = OptimizeOptions {
        service_time_minutes: 0.0,
        ..OptimizeOptions::default()
    };
    let slow = OptimizeOptions {
        service_time_minutes: 10.0,
        ..OptimizeOptions::default()
    };

    let quick_route = optimize(&stops, &quick, None).expect("optimize");
    let slow_route = optimize(&stops, &slow, None).expect("optimize");

    let visited_after_start = (stops.len() - 1) as f64;
    let expected_extra = visited_after_start * 10.0;
    let extra = slow_route.total_time_minutes - quick_route.total_time_minutes;
    assert!(
        (extra - expected_extra).abs() < 0.2,
        "expected ~{expected_extra} extra minutes, got {extra}"
    );
}

#[test]
fn test_vehicle_start_prepended_to_round() {
    let stops = delivery_round();
    let options = OptimizeOptions {
        start_location: Some(StartLocation::new(
            "vehicle_start",
            DEPOTS[1].lat,
            DEPOTS[1].lng,
        )),
        ..OptimizeOptions::default()
    };

    let route = optimize(&stops, &options, None).expect("optimize");
    assert_eq!(route.stops[0].stop_id, "vehicle_start");
    assert_eq!(route.stops.len(), stops.len() + 1);
}

// ============================================================================
// Tour Quality
// ============================================================================

#[test]
fn test_two_opt_improves_a_naive_city_tour() {
    // Visit every site in fixture order: a deliberately poor tour that
    // zig-zags across the city. 2-opt should shave a noticeable share.
    let stops: Vec<Stop> = DEPOTS
        .iter()
        .chain(WAREHOUSES)
        .chain(SHOPS)
        .map(|site| stop_at(site, StopKind::Waypoint))
        .collect();
    let matrix = DistanceMatrix::build(&stops).expect("build matrix");

    let naive: Vec<usize> = (0..stops.len()).collect();
    let improved = two_opt(&naive, &stops, &matrix, &SolverConfig::default());

    let naive_km = matrix.tour_distance(&naive);
    let improved_km = matrix.tour_distance(&improved);
    assert!(
        improved_km < naive_km,
        "expected improvement over {naive_km:.1} km, got {improved_km:.1} km"
    );

    assert_eq!(improved[0], 0);
    assert_eq!(improved[improved.len() - 1], stops.len() - 1);
}

#[test]
fn test_large_waypoint_round_stays_within_pass_cap() {
    let stops: Vec<Stop> = DEPOTS
        .iter()
        .chain(WAREHOUSES)
        .chain(SHOPS)
        .map(|site| stop_at(site, StopKind::Waypoint))
        .collect();

    let options = OptimizeOptions {
        solver: SolverConfig {
            enforce_precedence: false,
            max_passes: 5,
            ..SolverConfig::default()
        },
        ..OptimizeOptions::default()
    };

    // A tight pass cap still yields a complete, annotated route.
    let route = optimize(&stops, &options, None).expect("optimize");
    assert_eq!(route.stops.len(), stops.len());
}
