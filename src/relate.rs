use geo_types::{Geometry, MultiLineString, MultiPolygon};
use tracing::debug;

use crate::cell::CellId;
use crate::coverer::ConstrainedCoverer;
use crate::error::{Error, Result};
use crate::features::GeometricFeature;
use crate::geom;
use crate::ont;
use crate::rdf::{Graph, Term};
use crate::tiling::Tiler;

/**
 * Turns one feature's coverings into topological relation triples. Areas
 * contain their interior filling and overlap their boundary cells, curves
 * cross their covering cells, points sit within their enclosing cell; every
 * relation is emitted in both directions. Cell metadata is someone else's
 * job.
 */
#[derive(Debug)]
pub struct RelationMaterializer<'a> {
    tiler: &'a Tiler,
    min_level: i32,
    max_level: i32,
}

impl<'a> RelationMaterializer<'a> {
    pub fn new(tiler: &'a Tiler, min_level: i32, max_level: i32) -> RelationMaterializer<'a> {
        RelationMaterializer {
            tiler,
            min_level,
            max_level,
        }
    }

    /**
     * The relation triples between `feature` and the cells its geometry
     * reaches. The passed coverer drives the interior filling (so compressed
     * runs can widen its level range); boundary and crossing coverings use a
     * coverer at the configured `[min_level, max_level]`.
     */
    pub fn relations(
        &self,
        feature: &GeometricFeature,
        coverer: &mut ConstrainedCoverer,
    ) -> Result<Graph> {
        let mut graph = Graph::new();
        match &feature.geometry {
            Geometry::Polygon(polygon) => {
                let multi = MultiPolygon(vec![polygon.clone()]);
                self.area_relations(&mut graph, feature, &multi, coverer);
            }
            Geometry::MultiPolygon(multi) => {
                self.area_relations(&mut graph, feature, multi, coverer);
            }
            Geometry::LineString(line) => {
                let lines = MultiLineString(vec![line.clone()]);
                self.curve_relations(&mut graph, feature, &lines);
            }
            Geometry::MultiLineString(lines) => {
                self.curve_relations(&mut graph, feature, lines);
            }
            Geometry::Point(point) => {
                let cell = self.tiler.enclosing_cell(point)?;
                let cell_iri = ont::cell_iri(cell);
                graph.add(feature.iri.as_str(), ont::SF_WITHIN, Term::iri(cell_iri.as_str()));
                graph.add(cell_iri.as_str(), ont::SF_CONTAINS, Term::iri(feature.iri.as_str()));
            }
            other => {
                return Err(Error::UnsupportedGeometry(geom::kind_name(other).to_string()));
            }
        }
        debug!(feature = %feature.iri, triples = graph.len(), "materialized relations");
        Ok(graph)
    }

    fn area_relations(
        &self,
        graph: &mut Graph,
        feature: &GeometricFeature,
        multi: &MultiPolygon<f64>,
        coverer: &mut ConstrainedCoverer,
    ) {
        for cell in self.tiler.interior_filling(multi, coverer) {
            let cell_iri = ont::cell_iri(cell);
            graph.add(feature.iri.as_str(), ont::SF_CONTAINS, Term::iri(cell_iri.as_str()));
            graph.add(cell_iri.as_str(), ont::SF_WITHIN, Term::iri(feature.iri.as_str()));
        }
        let mut boundary_coverer = self.curve_coverer();
        for cell in self.tiler.boundary_overlap(multi, &mut boundary_coverer) {
            self.symmetric(graph, feature, cell, ont::SF_OVERLAPS);
        }
    }

    fn curve_relations(
        &self,
        graph: &mut Graph,
        feature: &GeometricFeature,
        lines: &MultiLineString<f64>,
    ) {
        let mut coverer = self.curve_coverer();
        for cell in self.tiler.line_crossing(lines, &mut coverer) {
            self.symmetric(graph, feature, cell, ont::SF_CROSSES);
        }
    }

    fn symmetric(&self, graph: &mut Graph, feature: &GeometricFeature, cell: CellId, predicate: &str) {
        let cell_iri = ont::cell_iri(cell);
        graph.add(feature.iri.as_str(), predicate, Term::iri(cell_iri.as_str()));
        graph.add(cell_iri.as_str(), predicate, Term::iri(feature.iri.as_str()));
    }

    // Boundary and crossing queries always run at the configured range, even
    // when the filling coverer was widened for compressed output.
    fn curve_coverer(&self) -> ConstrainedCoverer {
        ConstrainedCoverer::new(self.min_level, self.max_level)
    }
}
