//! Real Lyon metropolitan area locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap. Distances between these sites
//! range from under 2 km (adjacent districts) to ~15 km (suburban depots),
//! which is representative of the missions the planner handles.

/// A named site with coordinates.
#[derive(Debug, Clone)]
pub struct Site {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Site {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }
}

// ============================================================================
// Logistics Depots (good for mission start points)
// ============================================================================

pub const DEPOTS: &[Site] = &[
    Site::new("Entrepot Corbas", 45.6660, 4.9022),
    Site::new("Plateforme Saint-Priest", 45.6962, 4.9434),
    Site::new("Hub Venissieux", 45.6972, 4.8861),
];

// ============================================================================
// Supplier Warehouses (pickup sites)
// ============================================================================

pub const WAREHOUSES: &[Site] = &[
    Site::new("Marche Gare Confluence", 45.7404, 4.8158),
    Site::new("Halles Part-Dieu", 45.7628, 4.8557),
    Site::new("Depot Gerland", 45.7286, 4.8320),
    Site::new("Atelier Villeurbanne", 45.7667, 4.8794),
];

// ============================================================================
// Delivery Points (dropoff sites)
// ============================================================================

pub const SHOPS: &[Site] = &[
    Site::new("Boutique Bellecour", 45.7578, 4.8320),
    Site::new("Epicerie Vieux Lyon", 45.7640, 4.8270),
    Site::new("Magasin Croix-Rousse", 45.7746, 4.8277),
    Site::new("Comptoir Caluire", 45.7847, 4.8463),
    Site::new("Relais Oullins", 45.7147, 4.8076),
    Site::new("Point Ecully", 45.7744, 4.7772),
    Site::new("Commerce Bron", 45.7395, 4.9132),
];
