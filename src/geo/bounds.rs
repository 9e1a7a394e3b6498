//! Geographic bounding boxes.

use geo_types::Coord;

/// An axis-aligned lon/lat bounding box (x = lon, y = lat).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl GeoBounds {
    /// Creates bounds covering a single coordinate.
    pub fn from_coord(coord: Coord<f64>) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    /// Returns the bounds of the given coordinates, or None if there are none.
    pub fn from_coords<'a>(coords: impl IntoIterator<Item = &'a Coord<f64>>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_coord(*iter.next()?);
        for coord in iter {
            bounds.extend(*coord);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, coord: Coord<f64>) {
        self.min.x = self.min.x.min(coord.x);
        self.min.y = self.min.y.min(coord.y);
        self.max.x = self.max.x.max(coord.x);
        self.max.y = self.max.y.max(coord.y);
    }

    pub fn union(&self, other: &GeoBounds) -> GeoBounds {
        let mut merged = *self;
        merged.extend(other.min);
        merged.extend(other.max);
        merged
    }

    /// Merges optional bounds, treating None as empty.
    pub fn merge(a: Option<GeoBounds>, b: Option<GeoBounds>) -> Option<GeoBounds> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    /// Top-left corner in map orientation.
    pub fn north_west(&self) -> Coord<f64> {
        Coord {
            x: self.min.x,
            y: self.max.y,
        }
    }

    pub fn south_east(&self) -> Coord<f64> {
        Coord {
            x: self.max.x,
            y: self.min.y,
        }
    }

    pub fn contains(&self, coord: Coord<f64>) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
    }

    pub fn intersects(&self, other: &GeoBounds) -> bool {
        !(other.max.x < self.min.x
            || other.min.x > self.max.x
            || other.max.y < self.min.y
            || other.min.y > self.max.y)
    }
}
