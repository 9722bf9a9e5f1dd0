// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::geojson::{Geometry, Ring};
use serde::{Deserialize, Serialize};

/// Smallest denominator used when intersecting a ring edge with the test latitude.
const EDGE_EPSILON: f64 = 1e-12;

/// `[minLng, minLat, maxLng, maxLat]`, serialised as a 4-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lng: f64, min_lat: f64, max_lng: f64, max_lat: f64) -> Self {
        Self {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.min_lng, self.min_lat, self.max_lng, self.max_lat]
    }

    pub fn contains(&self, lng: f64, lat: f64) -> bool {
        lng >= self.min_lng && lng <= self.max_lng && lat >= self.min_lat && lat <= self.max_lat
    }

    /// `(lng, lat)` of the box centre.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    fn extend(&mut self, [lng, lat]: [f64; 2]) {
        self.min_lng = self.min_lng.min(lng);
        self.min_lat = self.min_lat.min(lat);
        self.max_lng = self.max_lng.max(lng);
        self.max_lat = self.max_lat.max(lat);
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from([min_lng, min_lat, max_lng, max_lat]: [f64; 4]) -> Self {
        Self::new(min_lng, min_lat, max_lng, max_lat)
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

/// Bounding box over every ring, holes included. `None` for unsupported
/// geometries and for geometries without a single point.
pub fn bbox(geometry: &Geometry) -> Option<BoundingBox> {
    let mut points = geometry
        .polygons()
        .into_iter()
        .flat_map(|rings| rings.iter())
        .flat_map(|ring| ring.iter().copied());

    let [lng, lat] = points.next()?;
    let mut b = BoundingBox::new(lng, lat, lng, lat);
    for pt in points {
        b.extend(pt);
    }
    Some(b)
}

/// Even-odd ray cast against a single ring. Points exactly on a horizontal
/// edge have no defined answer.
pub fn point_in_ring(lng: f64, lat: f64, ring: &[[f64; 2]]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > lat) != (yj > lat) {
            let mut dy = yj - yi;
            if dy.abs() < EDGE_EPSILON {
                dy = EDGE_EPSILON.copysign(dy);
            }
            let x_intersect = (xj - xi) * (lat - yi) / dy + xi;
            if lng < x_intersect {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Inside the outer ring and outside every hole.
pub fn point_in_polygon(lng: f64, lat: f64, rings: &[Ring]) -> bool {
    let Some((outer, holes)) = rings.split_first() else {
        return false;
    };
    point_in_ring(lng, lat, outer) && !holes.iter().any(|hole| point_in_ring(lng, lat, hole))
}

/// Point containment for Polygon (holes respected) and MultiPolygon (any
/// member). Unsupported geometries contain nothing.
pub fn contains(lng: f64, lat: f64, geometry: &Geometry) -> bool {
    geometry
        .polygons()
        .into_iter()
        .any(|rings| point_in_polygon(lng, lat, rings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Ring {
        vec![[x0, y0], [x1, y0], [x1, y1], [x0, y1], [x0, y0]]
    }

    #[test]
    fn test_bbox_unit_square() {
        let geom: Geometry = serde_json::from_value(json!({
            "type": "Polygon",
            "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
        }))
        .unwrap();
        let b = bbox(&geom).unwrap();
        assert_eq!(b.to_array(), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(serde_json::to_value(b).unwrap(), json!([0.0, 0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_bbox_multipolygon_and_holes() {
        let geom = Geometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0, 1.0)],
            vec![square(5.0, 5.0, 6.0, 6.0), square(5.2, 5.2, 5.8, 5.8)],
        ]);
        assert_eq!(bbox(&geom).unwrap().to_array(), [0.0, 0.0, 6.0, 6.0]);

        // A hole sticking out of its outer ring still widens the box
        let geom = Geometry::Polygon(vec![square(0.0, 0.0, 1.0, 1.0), square(0.5, 0.5, 3.0, 0.8)]);
        assert_eq!(bbox(&geom).unwrap().to_array(), [0.0, 0.0, 3.0, 1.0]);
    }

    #[test]
    fn test_bbox_empty_and_unsupported() {
        assert_eq!(bbox(&Geometry::Polygon(vec![])), None);
        assert_eq!(bbox(&Geometry::Polygon(vec![vec![]])), None);
        assert_eq!(bbox(&Geometry::MultiPolygon(vec![])), None);
        assert_eq!(bbox(&Geometry::Unsupported(Value::Null)), None);
        let point = Geometry::from(json!({"type": "Point", "coordinates": [1.0, 2.0]}));
        assert_eq!(bbox(&point), None);
    }

    #[test]
    fn test_contains_with_hole() {
        let geom = Geometry::Polygon(vec![
            vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]],
            vec![[0.5, 0.5], [1.5, 0.5], [1.5, 1.5], [0.5, 1.5]],
        ]);
        assert!(!contains(1.0, 1.0, &geom), "centre sits in the hole");
        assert!(contains(0.25, 0.25, &geom));
        assert!(!contains(3.0, 3.0, &geom));
    }

    #[test]
    fn test_contains_multipolygon() {
        let geom = Geometry::MultiPolygon(vec![
            vec![square(0.0, 0.0, 1.0, 1.0)],
            vec![square(5.0, 5.0, 6.0, 6.0)],
        ]);
        assert!(contains(5.5, 5.5, &geom));
        assert!(contains(0.5, 0.5, &geom));
        assert!(!contains(10.0, 10.0, &geom));
        assert!(!contains(3.0, 3.0, &geom));
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(!point_in_ring(0.0, 0.0, &[]));
        assert!(!point_in_ring(0.5, 0.5, &[[0.0, 0.0], [1.0, 1.0]]));
        assert!(!contains(0.0, 0.0, &Geometry::Polygon(vec![])));
        assert!(!contains(0.0, 0.0, &Geometry::Polygon(vec![vec![[0.0, 0.0]]])));
        assert!(!contains(0.0, 0.0, &Geometry::Unsupported(Value::Null)));
    }

    #[test]
    fn test_concave_ring() {
        // U shape opening upwards
        let ring = vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
        ];
        assert!(point_in_ring(0.5, 2.0, &ring));
        assert!(point_in_ring(2.5, 2.0, &ring));
        assert!(!point_in_ring(1.5, 2.0, &ring));
        assert!(point_in_ring(1.5, 0.5, &ring));
    }

    #[test]
    fn test_ring_orientation_does_not_matter() {
        let mut ring = square(0.0, 0.0, 4.0, 4.0);
        assert!(point_in_ring(2.0, 2.0, &ring));
        ring.reverse();
        assert!(point_in_ring(2.0, 2.0, &ring));
    }

    #[test]
    fn test_near_horizontal_edge_keeps_direction() {
        // Bottom edge rises by 1e-13 from (0, 0) to (10, 1e-13), below EDGE_EPSILON
        let lat = 5e-14;
        let mut ring = vec![[0.0, 0.0], [10.0, 1e-13], [10.0, 1.0], [0.0, 1.0]];

        // Walked (10, 1e-13) -> (0, 0): dy is negative
        assert!(point_in_ring(0.2, lat, &ring));
        assert!(!point_in_ring(10.2, lat, &ring), "right of the ring");

        // Walked the other way: dy is positive
        ring.reverse();
        assert!(point_in_ring(0.2, lat, &ring));
        assert!(!point_in_ring(10.2, lat, &ring), "right of the ring");
    }

    #[test]
    fn test_box_helpers() {
        let b = BoundingBox::new(120.0, 5.0, 126.0, 19.0);
        assert!(b.contains(121.0, 14.6));
        assert!(!b.contains(106.8, -6.2));
        assert_eq!(b.center(), (123.0, 12.0));

        let u = b.union(&BoundingBox::new(95.0, -11.0, 141.0, 6.0));
        assert_eq!(u.to_array(), [95.0, -11.0, 141.0, 19.0]);

        let parsed: BoundingBox = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(parsed, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }
}
