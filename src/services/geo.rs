//! Geographic calculations

use crate::types::{Coordinates, Polygon, Stop};

/// Crossing-number test: cast a ray from `point` towards increasing
/// longitude and count the polygon edges it crosses. Odd means inside.
pub fn is_inside(point: &Coordinates, polygon: &Polygon) -> bool {
    let mut crossings = 0usize;

    for (p1, p2) in polygon.edges() {
        if (p1.lat > point.lat) != (p2.lat > point.lat) {
            let lng_at_lat = (p2.lng - p1.lng) * (point.lat - p1.lat) / (p2.lat - p1.lat) + p1.lng;
            if point.lng < lng_at_lat {
                crossings += 1;
            }
        }
    }

    crossings % 2 == 1
}

/// Stops whose position lies inside `polygon`, in input order
pub fn collect_inside<'a>(stops: impl IntoIterator<Item = &'a Stop>, polygon: &Polygon) -> Vec<&'a Stop> {
    stops
        .into_iter()
        .filter(|stop| is_inside(&stop.position(), polygon))
        .collect()
}

/// Axis-aligned box around a set of points, used to fit the map view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

impl Bounds {
    /// Returns `None` for an empty point set
    pub fn from_points(points: impl IntoIterator<Item = Coordinates>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds {
            south_west: first,
            north_east: first,
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: Coordinates) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }
}
