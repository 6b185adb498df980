//! Haversine distances and the all-pairs distance matrix.
//!
//! Great-circle distance ignores roads, but it is always available and
//! good enough for stop ordering.

use rayon::prelude::*;

use crate::optimizer::OptimizeError;
use crate::stop::{Coordinates, Stop};

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Dense all-pairs distance table over a stop set, in kilometers.
///
/// Indexed by the stop order given to [`DistanceMatrix::build`]. Symmetric
/// in value with a zero diagonal.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// Build the matrix for `stops`.
    ///
    /// Every stop must carry valid coordinates; callers filter unusable
    /// stops out beforehand.
    pub fn build(stops: &[Stop]) -> Result<Self, OptimizeError> {
        if let Some(bad) = stops.iter().find(|stop| !stop.coordinates.is_valid()) {
            return Err(OptimizeError::InvalidCoordinates {
                stop_id: bad.id.clone(),
            });
        }

        let distances = stops
            .par_iter()
            .enumerate()
            .map(|(i, from)| {
                stops
                    .iter()
                    .enumerate()
                    .map(|(j, to)| {
                        if i == j {
                            0.0
                        } else {
                            haversine_km(from.coordinates, to.coordinates)
                        }
                    })
                    .collect()
            })
            .collect();

        Ok(Self { distances })
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.distances[from][to]
    }

    /// Total distance of a visiting order (sum over consecutive legs).
    pub fn tour_distance(&self, order: &[usize]) -> f64 {
        order
            .windows(2)
            .map(|leg| self.distances[leg[0]][leg[1]])
            .sum()
    }
}
