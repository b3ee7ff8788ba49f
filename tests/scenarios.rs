//! End-to-end expectations for the public API: IRI generation, coverer
//! construction, level enumeration, and the feature stream.

use std::fs;
use std::io::Write;

use cellgraph::{
    cell::CellId, coverer::ConstrainedCoverer, features::GeometricFeatures, ont,
    relate::RelationMaterializer, tiling::Tiler,
};
use geo_types::Geometry;

const POLYGON_NORTH: &str = "POLYGON((-90 45,-90 0,-45 0,-45 35.264389682754654,-90 45))";
const POLYGON_SOUTH: &str = "POLYGON((-90 0,-90 -45,-45 -35.264389682754654,-45 0,-90 0))";

#[test]
fn cell_iri_for_a_level_one_cell() {
    let iri = ont::cell_iri(CellId::from_id(288230376151711744));
    assert_eq!(
        iri,
        "http://stko-kwg.geog.ucsb.edu/lod/resource/s2.level1.288230376151711744"
    );
}

#[test]
fn point_features_produce_exactly_two_relation_triples() {
    let tiler = Tiler::new(1e-2);
    let materializer = RelationMaterializer::new(&tiler, 0, 30);
    let mut coverer = ConstrainedCoverer::default();
    let feature = cellgraph::GeometricFeature {
        iri: "http://example.com/p1".to_string(),
        geometry: Geometry::Point(geo_types::Point::new(-118.25, 34.05)),
    };
    let graph = materializer.relations(&feature, &mut coverer).unwrap();

    let enclosing = CellId::from_point(34.05, -118.25).parent().unwrap();
    let cell_iri = ont::cell_iri(enclosing);
    let triples: Vec<_> = graph.iter().collect();
    assert_eq!(triples.len(), 2);
    assert!(graph.contains(&cellgraph::Triple::new(
        "http://example.com/p1",
        ont::SF_WITHIN,
        cellgraph::Term::iri(cell_iri.as_str()),
    )));
    assert!(graph.contains(&cellgraph::Triple::new(
        cell_iri.as_str(),
        ont::SF_CONTAINS,
        cellgraph::Term::iri("http://example.com/p1"),
    )));
}

#[test]
fn constrained_coverer_reports_its_bounds() {
    let coverer = ConstrainedCoverer::new(9, 10);
    assert_eq!(coverer.min_level(), 9);
    assert_eq!(coverer.max_level(), 10);
}

#[test]
fn level_zero_has_exactly_six_cells() {
    assert_eq!(CellId::iter_at_level(0).count(), 6);
}

#[test]
fn feature_stream_yields_one_record_per_feature() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = fs::File::create(dir.path().join("polygons.nt")).unwrap();
    for (i, wkt) in [POLYGON_NORTH, POLYGON_SOUTH].iter().enumerate() {
        writeln!(
            file,
            "<http://example.com/f{i}> <http://www.opengis.net/ont/geosparql#hasGeometry> <http://example.com/f{i}/geom> ."
        )
        .unwrap();
        writeln!(
            file,
            "<http://example.com/f{i}/geom> <http://www.opengis.net/ont/geosparql#asWKT> \"{wkt}\" ."
        )
        .unwrap();
    }
    drop(file);

    let features = GeometricFeatures::new(dir.path()).features().unwrap();
    assert_eq!(features.len(), 2);
    assert!(features
        .iter()
        .all(|f| matches!(f.geometry, Geometry::Polygon(_))));
    assert_eq!(features[0].iri, "http://example.com/f0");
    assert_eq!(features[1].iri, "http://example.com/f1");
}
