use wkt::ToWkt;

use crate::cell::CellId;
use crate::error::Result;
use crate::geom;
use crate::ont;
use crate::rdf::{Graph, Term};

/// Earth radius used to scale unit-sphere areas to square metres.
pub const EARTH_RADIUS_METERS: f64 = 6.3781e6;

/**
 * Emits the full metadata triple set for individual cells: class and label,
 * numeric id, metric area, the vertex polygon with its WKT serialization,
 * `sfTouches` edges to every neighbor, and the `sfWithin`/`sfContains` pair
 * up to the parent. Stateless per cell; the only configuration is which
 * ancestor the parent edges point at.
 */
#[derive(Debug, Clone, Copy, Default)]
pub struct CellDescriber {
    target_parent_level: Option<u64>,
}

impl CellDescriber {
    pub fn new(target_parent_level: Option<u64>) -> CellDescriber {
        CellDescriber {
            target_parent_level,
        }
    }

    pub fn describe(&self, cell: CellId) -> Result<Graph> {
        let mut graph = Graph::new();
        self.describe_into(&mut graph, cell)?;
        Ok(graph)
    }

    pub fn describe_into(&self, graph: &mut Graph, cell: CellId) -> Result<()> {
        let iri = ont::cell_iri(cell);
        let level = cell.level();
        let id = cell.id();

        graph.add(iri.as_str(), ont::RDF_TYPE, Term::iri(ont::cell_class(level)));
        graph.add(
            iri.as_str(),
            ont::RDFS_LABEL,
            Term::literal(
                format!("S2 Cell at level {level} with ID {id}"),
                ont::XSD_STRING,
            ),
        );
        graph.add(
            iri.as_str(),
            ont::CELL_ID,
            Term::literal(id.to_string(), ont::XSD_INTEGER),
        );

        let area_on_sphere = cell.to_cell().approx_area();
        let area_on_earth = area_on_sphere * EARTH_RADIUS_METERS * EARTH_RADIUS_METERS;
        graph.add(
            iri.as_str(),
            ont::GEO_HAS_METRIC_AREA,
            Term::literal(area_on_earth.to_string(), ont::XSD_FLOAT),
        );

        let geometry_iri = ont::cell_geometry_iri(cell);
        graph.add(iri.as_str(), ont::GEO_HAS_GEOMETRY, Term::iri(geometry_iri.as_str()));
        graph.add(
            iri.as_str(),
            ont::GEO_HAS_DEFAULT_GEOMETRY,
            Term::iri(geometry_iri.as_str()),
        );
        graph.add(geometry_iri.as_str(), ont::RDF_TYPE, Term::iri(ont::GEO_GEOMETRY));
        graph.add(geometry_iri.as_str(), ont::RDF_TYPE, Term::iri(ont::SF_POLYGON));
        graph.add(
            geometry_iri.as_str(),
            ont::RDFS_LABEL,
            Term::literal(
                format!(
                    "Geometry of the polygon formed from the vertices of the S2 Cell at level {level} with ID {id}"
                ),
                ont::XSD_STRING,
            ),
        );
        let wkt = geom::vertex_polygon(cell).wkt_string();
        graph.add(
            geometry_iri.as_str(),
            ont::GEO_AS_WKT,
            Term::literal(wkt, ont::GEO_WKT_LITERAL),
        );

        for neighbor in cell.neighbors_at(level) {
            let neighbor_iri = ont::cell_iri(neighbor);
            graph.add(iri.as_str(), ont::SF_TOUCHES, Term::iri(neighbor_iri.as_str()));
            graph.add(neighbor_iri.as_str(), ont::SF_TOUCHES, Term::iri(iri.as_str()));
        }

        if level > 0 {
            let parent = match self.target_parent_level {
                Some(target) => cell.parent_at(target)?,
                None => cell.parent()?,
            };
            let parent_iri = ont::cell_iri(parent);
            graph.add(iri.as_str(), ont::SF_WITHIN, Term::iri(parent_iri.as_str()));
            graph.add(parent_iri.as_str(), ont::SF_CONTAINS, Term::iri(iri.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::rdf::Triple;

    use super::*;

    fn cell_under_test() -> CellId {
        CellId::from_point(34.05, -118.25).parent_at(6).unwrap()
    }

    #[test]
    fn metadata_triples_are_complete() {
        let cell = cell_under_test();
        let graph = CellDescriber::new(None).describe(cell).unwrap();
        let iri = ont::cell_iri(cell);
        let geometry_iri = ont::cell_geometry_iri(cell);

        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::RDF_TYPE,
            Term::iri(ont::cell_class(6)),
        )));
        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::RDFS_LABEL,
            Term::literal(
                format!("S2 Cell at level 6 with ID {}", cell.id()),
                ont::XSD_STRING,
            ),
        )));
        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::CELL_ID,
            Term::literal(cell.id().to_string(), ont::XSD_INTEGER),
        )));
        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::GEO_HAS_GEOMETRY,
            Term::iri(geometry_iri.as_str()),
        )));
        assert!(graph.contains(&Triple::new(
            geometry_iri.as_str(),
            ont::RDF_TYPE,
            Term::iri(ont::SF_POLYGON),
        )));

        let wkt = graph.iter().find_map(|t| match &t.object {
            Term::Literal { value, datatype }
                if t.predicate == ont::GEO_AS_WKT && *datatype == ont::GEO_WKT_LITERAL =>
            {
                Some(value.clone())
            }
            _ => None,
        });
        assert!(wkt.unwrap().starts_with("POLYGON"));

        let area = graph.iter().find_map(|t| match &t.object {
            Term::Literal { value, .. } if t.predicate == ont::GEO_HAS_METRIC_AREA => {
                value.parse::<f64>().ok()
            }
            _ => None,
        });
        assert!(area.unwrap() > 0.0);
    }

    #[test]
    fn neighbor_touches_are_symmetric() {
        let cell = cell_under_test();
        let graph = CellDescriber::new(None).describe(cell).unwrap();
        let iri = ont::cell_iri(cell);
        for neighbor in cell.neighbors_at(6) {
            let neighbor_iri = ont::cell_iri(neighbor);
            assert!(graph.contains(&Triple::new(
                iri.as_str(),
                ont::SF_TOUCHES,
                Term::iri(neighbor_iri.as_str()),
            )));
            assert!(graph.contains(&Triple::new(
                neighbor_iri.as_str(),
                ont::SF_TOUCHES,
                Term::iri(iri.as_str()),
            )));
        }
    }

    #[test]
    fn parent_links_honor_the_target_level() {
        let cell = cell_under_test();
        let iri = ont::cell_iri(cell);

        let graph = CellDescriber::new(None).describe(cell).unwrap();
        let parent_iri = ont::cell_iri(cell.parent().unwrap());
        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::SF_WITHIN,
            Term::iri(parent_iri.as_str()),
        )));
        assert!(graph.contains(&Triple::new(
            parent_iri.as_str(),
            ont::SF_CONTAINS,
            Term::iri(iri.as_str()),
        )));

        let graph = CellDescriber::new(Some(2)).describe(cell).unwrap();
        let ancestor_iri = ont::cell_iri(cell.parent_at(2).unwrap());
        assert!(graph.contains(&Triple::new(
            iri.as_str(),
            ont::SF_WITHIN,
            Term::iri(ancestor_iri.as_str()),
        )));

        // A target below the cell's own level is a hard error.
        assert!(CellDescriber::new(Some(9)).describe(cell).is_err());
    }

    #[test]
    fn face_cells_have_no_parent_links() {
        let graph = CellDescriber::new(None)
            .describe(CellId::face_cells()[2])
            .unwrap();
        assert!(graph.iter().all(|t| t.predicate != ont::SF_WITHIN));
    }
}
