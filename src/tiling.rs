use geo_types::{Geometry, MultiLineString, MultiPolygon, Point};

use crate::cell::CellId;
use crate::coverer::ConstrainedCoverer;
use crate::error::{Error, Result};
use crate::geom;
use crate::region::{CurveRegion, PolygonRegion};

/**
 * Constants of the saturation loop: the interior filling retries with a
 * budget of `10^exponent` cells for each exponent in the range, and stops
 * once a budget increase grows the covering by less than `growth_factor`.
 */
#[derive(Debug, Clone, Copy)]
pub struct SaturationParams {
    pub min_exponent: u32,
    pub max_exponent: u32,
    pub growth_factor: usize,
}

impl Default for SaturationParams {
    fn default() -> SaturationParams {
        SaturationParams {
            min_exponent: 4,
            max_exponent: 8,
            growth_factor: 10,
        }
    }
}

/**
 * Produces the cell sets the relation materializer needs: saturated
 * interior fillings of areas, coverings of ring buffers and line buffers,
 * homogeneous coverings, and single-cell point enclosures.
 */
#[derive(Debug, Clone)]
pub struct Tiler {
    tolerance: f64,
    saturation: SaturationParams,
}

impl Tiler {
    pub fn new(tolerance: f64) -> Tiler {
        Tiler {
            tolerance,
            saturation: SaturationParams::default(),
        }
    }

    pub fn with_saturation(tolerance: f64, saturation: SaturationParams) -> Tiler {
        Tiler {
            tolerance,
            saturation,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /**
     * A saturated interior filling of a polygonal geometry: pairwise
     * disjoint cells wholly inside it. The budget grows by a decimal
     * exponent per round; once a round comes back smaller than a tenth of
     * its budget, more budget cannot grow the filling by another order of
     * magnitude and the filling is considered saturated.
     */
    pub fn interior_filling(
        &self,
        multi: &MultiPolygon<f64>,
        coverer: &mut ConstrainedCoverer,
    ) -> Vec<CellId> {
        let region = PolygonRegion::new(multi, self.tolerance);
        let mut filling = Vec::new();
        for exponent in self.saturation.min_exponent..=self.saturation.max_exponent {
            let max_cells = 10usize.pow(exponent);
            coverer.set_max_cells(max_cells);
            filling = coverer.interior_covering(&region);
            if filling.len() < max_cells / self.saturation.growth_factor {
                break;
            }
        }
        filling
    }

    /**
     * Cells overlapping the boundary of a polygonal geometry: every ring is
     * segmentized, fattened by `tolerance / 100`, and covered. Results are
     * concatenated across rings; the set-valued triple buffer absorbs any
     * duplicate downstream.
     */
    pub fn boundary_overlap(
        &self,
        multi: &MultiPolygon<f64>,
        coverer: &mut ConstrainedCoverer,
    ) -> Vec<CellId> {
        let mut cells = Vec::new();
        for ring in geom::boundaries(multi) {
            let region = CurveRegion::from_ring(ring, self.tolerance);
            cells.extend(coverer.covering(&region));
        }
        cells
    }

    /// Cells crossed by a (multi)line string, via the same thin buffer.
    pub fn line_crossing(
        &self,
        lines: &MultiLineString<f64>,
        coverer: &mut ConstrainedCoverer,
    ) -> Vec<CellId> {
        let region = CurveRegion::new(lines, self.tolerance);
        coverer.covering(&region)
    }

    /// The single cell enclosing a point: one level above the leaf.
    pub fn enclosing_cell(&self, point: &Point<f64>) -> Result<CellId> {
        CellId::from_point(point.y(), point.x()).parent()
    }

    /**
     * A homogeneous exterior covering of any supported geometry at the
     * coverer's level range, used by the overlap generator to decide which
     * cells to describe.
     */
    pub fn covering(
        &self,
        geometry: &Geometry<f64>,
        coverer: &mut ConstrainedCoverer,
    ) -> Result<Vec<CellId>> {
        match geometry {
            Geometry::Polygon(polygon) => {
                let region = PolygonRegion::from_polygon(polygon, self.tolerance);
                Ok(coverer.covering(&region))
            }
            Geometry::MultiPolygon(multi) => {
                let region = PolygonRegion::new(multi, self.tolerance);
                Ok(coverer.covering(&region))
            }
            Geometry::LineString(line) => {
                let lines = MultiLineString(vec![line.clone()]);
                Ok(coverer.covering(&CurveRegion::new(&lines, self.tolerance)))
            }
            Geometry::MultiLineString(lines) => {
                Ok(coverer.covering(&CurveRegion::new(lines, self.tolerance)))
            }
            Geometry::Point(point) => {
                let leaf = CellId::from_point(point.y(), point.x());
                Ok(vec![leaf.parent_at(u64::from(coverer.max_level()))?])
            }
            other => Err(Error::UnsupportedGeometry(geom::kind_name(other).to_string())),
        }
    }
}
