//! Geographic value types

use serde::{Deserialize, Serialize};

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A user-drawn region.
///
/// The ring is always treated as closed: a repeated closing vertex is
/// accepted but not required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    vertices: Vec<Coordinates>,
}

impl Polygon {
    pub fn new(vertices: Vec<Coordinates>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Coordinates] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Edges of the closed ring, including the wrap-around edge from the
    /// last vertex back to the first.
    pub fn edges(&self) -> impl Iterator<Item = (Coordinates, Coordinates)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// Parse a polygon from `lat,lng;lat,lng;...` text.
pub fn parse_polygon(text: &str) -> Result<Polygon, String> {
    let mut vertices = Vec::new();
    for pair in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (lat, lng) = pair
            .split_once(',')
            .ok_or_else(|| format!("expected 'lat,lng', got '{}'", pair))?;
        let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{}'", lat.trim()))?;
        let lng: f64 = lng.trim().parse().map_err(|_| format!("invalid longitude '{}'", lng.trim()))?;
        vertices.push(Coordinates::new(lat, lng));
    }

    if vertices.len() < 3 {
        return Err(format!("a polygon needs at least 3 vertices, got {}", vertices.len()));
    }

    Ok(Polygon::new(vertices))
}
