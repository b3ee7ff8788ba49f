use geo::{BoundingRect, EuclideanDistance, Intersects, Relate};
use geo_types::{LineString, MultiLineString, MultiPolygon, Point, Polygon, Rect};

use crate::cell::CellId;
use crate::geom;

/// How a cell sits relative to a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRelation {
    Disjoint,
    Intersecting,
    Contained,
}

/**
 * A region the coverer can interrogate cell by cell. Implementations answer
 * conservatively when exactness is unavailable: `Intersecting` may be
 * over-reported, `Contained` must never be.
 */
pub trait CellRegion {
    fn relation(&self, cell: CellId) -> CellRelation;
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>, margin: f64) -> bool {
    a.min().x - margin <= b.max().x
        && b.min().x <= a.max().x + margin
        && a.min().y - margin <= b.max().y
        && b.min().y <= a.max().y + margin
}

/**
 * A polygonal area prepared for covering: orientation-normalized and
 * segmentized so its planar rings approximate the great-circle edges the
 * vertices would span on the sphere.
 */
#[derive(Debug, Clone)]
pub struct PolygonRegion {
    geometry: MultiPolygon<f64>,
    bound: Option<Rect<f64>>,
}

impl PolygonRegion {
    pub fn new(multi: &MultiPolygon<f64>, tolerance: f64) -> PolygonRegion {
        let oriented = geom::orient_multi_polygon(multi, 1.0);
        let segmented = MultiPolygon(
            oriented
                .iter()
                .map(|polygon| {
                    Polygon::new(
                        geom::segmentize(polygon.exterior(), tolerance),
                        polygon
                            .interiors()
                            .iter()
                            .map(|ring| geom::segmentize(ring, tolerance))
                            .collect(),
                    )
                })
                .collect(),
        );
        let bound = segmented.bounding_rect();
        PolygonRegion {
            geometry: segmented,
            bound,
        }
    }

    pub fn from_polygon(polygon: &Polygon<f64>, tolerance: f64) -> PolygonRegion {
        PolygonRegion::new(&MultiPolygon(vec![polygon.clone()]), tolerance)
    }
}

impl CellRegion for PolygonRegion {
    fn relation(&self, cell: CellId) -> CellRelation {
        let Some(cell_polygon) = geom::planar_cell_polygon(cell) else {
            // No faithful planar rendering; let the descent refine it.
            return CellRelation::Intersecting;
        };
        if let (Some(bound), Some(cell_bound)) = (self.bound, cell_polygon.bounding_rect()) {
            if !rects_overlap(&bound, &cell_bound, 0.0) {
                return CellRelation::Disjoint;
            }
        }
        let matrix = self.geometry.relate(&cell_polygon);
        if matrix.is_contains() {
            CellRelation::Contained
        } else if matrix.is_intersects() {
            CellRelation::Intersecting
        } else {
            CellRelation::Disjoint
        }
    }
}

/**
 * A segmentized curve fattened by a buffer radius. A cell intersects the
 * region exactly when its planar polygon comes within `radius` of the curve,
 * which is the disc buffer without the polygonal approximation. A curve has
 * no interior, so no cell is ever contained.
 */
#[derive(Debug, Clone)]
pub struct CurveRegion {
    curve: MultiLineString<f64>,
    radius: f64,
    bound: Option<Rect<f64>>,
}

impl CurveRegion {
    pub fn new(lines: &MultiLineString<f64>, tolerance: f64) -> CurveRegion {
        let segmented = MultiLineString(
            lines
                .iter()
                .map(|line| geom::segmentize(line, tolerance))
                .collect(),
        );
        let bound = segmented.bounding_rect();
        CurveRegion {
            curve: segmented,
            radius: tolerance / 100.0,
            bound,
        }
    }

    pub fn from_ring(ring: &LineString<f64>, tolerance: f64) -> CurveRegion {
        CurveRegion::new(&MultiLineString(vec![ring.clone()]), tolerance)
    }

    fn within_radius(&self, cell_polygon: &Polygon<f64>) -> bool {
        for line in &self.curve {
            if cell_polygon.intersects(line) {
                return true;
            }
        }
        // Disjoint shapes attain their minimum distance at a vertex of one
        // of them, so scanning both vertex sets is exact.
        for line in &self.curve {
            for coord in &line.0 {
                if Point::from(*coord).euclidean_distance(cell_polygon) <= self.radius {
                    return true;
                }
            }
        }
        for coord in &cell_polygon.exterior().0 {
            let corner = Point::from(*coord);
            for line in &self.curve {
                if corner.euclidean_distance(line) <= self.radius {
                    return true;
                }
            }
        }
        false
    }
}

impl CellRegion for CurveRegion {
    fn relation(&self, cell: CellId) -> CellRelation {
        let Some(cell_polygon) = geom::planar_cell_polygon(cell) else {
            return CellRelation::Intersecting;
        };
        if let (Some(bound), Some(cell_bound)) = (self.bound, cell_polygon.bounding_rect()) {
            if !rects_overlap(&bound, &cell_bound, self.radius) {
                return CellRelation::Disjoint;
            }
        }
        if self.within_radius(&cell_polygon) {
            CellRelation::Intersecting
        } else {
            CellRelation::Disjoint
        }
    }
}
