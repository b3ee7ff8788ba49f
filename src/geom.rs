use geo::Densify;
use geo_types::{polygon, Coord, Geometry, LineString, MultiPolygon, Polygon};
use s2::latlng::LatLng;

use crate::cell::CellId;
use crate::nvec;

/**
 * Planar signed area of a ring (shoelace formula), computed in input
 * coordinates. Counter-clockwise rings are positive. This is the quantity
 * ring orientation is normalized against; it is deliberately not corrected
 * for spherical distortion, so rings straddling the antimeridian or
 * enclosing a pole may come out misoriented.
 */
pub fn ring_signed_area(ring: &LineString<f64>) -> f64 {
    let coords = &ring.0;
    if coords.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for window in coords.windows(2) {
        sum += window[0].x * window[1].y - window[1].x * window[0].y;
    }
    // Close the ring if the input does not repeat the first vertex.
    let (first, last) = (coords[0], coords[coords.len() - 1]);
    if first != last {
        sum += last.x * first.y - first.x * last.y;
    }
    sum / 2.0
}

/// A copy of the ring carrying the requested orientation sign.
pub fn orient_ring(ring: &LineString<f64>, sign: f64) -> LineString<f64> {
    if ring_signed_area(ring) / sign >= 0.0 {
        ring.clone()
    } else {
        let mut coords = ring.0.clone();
        coords.reverse();
        LineString(coords)
    }
}

/// Exterior ring takes `sign`, holes take the opposite orientation.
pub fn orient_polygon(polygon: &Polygon<f64>, sign: f64) -> Polygon<f64> {
    let exterior = orient_ring(polygon.exterior(), sign);
    let interiors = polygon
        .interiors()
        .iter()
        .map(|interior| orient_ring(interior, -sign))
        .collect();
    Polygon::new(exterior, interiors)
}

pub fn orient_multi_polygon(multi: &MultiPolygon<f64>, sign: f64) -> MultiPolygon<f64> {
    MultiPolygon(multi.iter().map(|p| orient_polygon(p, sign)).collect())
}

/// All boundary rings of a polygonal geometry: each exterior followed by its
/// interiors.
pub fn boundaries(multi: &MultiPolygon<f64>) -> Vec<&LineString<f64>> {
    let mut rings = Vec::new();
    for polygon in multi {
        rings.push(polygon.exterior());
        rings.extend(polygon.interiors());
    }
    rings
}

/**
 * Adds vertices to a curve until no two adjacent ones are farther apart than
 * `tolerance` (planar distance). This bounds the deviation introduced when
 * straight planar segments stand in for great-circle edges.
 */
pub fn segmentize(curve: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    curve.densify(tolerance)
}

/// The name of a geometry kind, for error reporting.
pub fn kind_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn corner_coords(cell: CellId) -> [Coord; 4] {
    cell.to_cell().vertices().map(LatLng::from).map(|ll| Coord {
        x: ll.lng.deg(),
        y: ll.lat.deg(),
    })
}

/**
 * The planar polygon formed by a cell's four vertices in (lon, lat) degrees,
 * ordered as S2 returns them and closed. This is the shape serialized as the
 * cell's WKT geometry.
 */
pub fn vertex_polygon(cell: CellId) -> Polygon<f64> {
    let v = corner_coords(cell);
    polygon!(v[0], v[1], v[2], v[3])
}

/**
 * A planar rendering of the cell suitable for DE-9IM comparison against
 * input geometries: corner vertices with great-circle edges densified at
 * coarse levels. Returns `None` when no planar rendering is faithful, i.e.
 * the cell crosses the antimeridian or touches a pole; callers treat such
 * cells conservatively.
 */
pub fn planar_cell_polygon(cell: CellId) -> Option<Polygon<f64>> {
    let corners = corner_coords(cell);

    let mut min_lng = f64::INFINITY;
    let mut max_lng = f64::NEG_INFINITY;
    for corner in &corners {
        if corner.y.abs() > 89.9999 {
            return None;
        }
        min_lng = min_lng.min(corner.x);
        max_lng = max_lng.max(corner.x);
    }
    if max_lng - min_lng > 180.0 {
        return None;
    }

    // Great-circle edges sag relative to their planar chord; at coarse
    // levels the sag is large enough to matter, so trace each edge through
    // intermediate points.
    let steps = match cell.level() {
        0..=3 => 8,
        4..=7 => 2,
        _ => 1,
    };
    let mut coords = Vec::with_capacity(4 * steps + 1);
    for i in 0..4 {
        let (a, b) = (corners[i], corners[(i + 1) % 4]);
        for s in 0..steps {
            let t = s as f64 / steps as f64;
            let p = if s == 0 { a } else { nvec::lerp(t, a, b) };
            if (p.x - a.x).abs() > 180.0 || (p.x - b.x).abs() > 180.0 {
                return None;
            }
            coords.push(p);
        }
    }
    coords.push(corners[0]);
    Some(Polygon::new(LineString(coords), vec![]))
}
