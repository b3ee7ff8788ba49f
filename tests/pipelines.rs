//! Drives the three run modes against temp directories and checks the
//! output trees: batch completeness in cell mode, relation pairing and
//! flush behavior in feature mode, per-batch files in overlap mode.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use cellgraph::config::{IntegrateConfig, LevelConfig, OverlapConfig};
use cellgraph::integrator::integrate;
use cellgraph::level::generate_level;
use cellgraph::ont;
use cellgraph::overlap::generate_overlap;
use cellgraph::writer::RdfFormat;

const POLYGON_NORTH: &str = "POLYGON((-90 45,-90 0,-45 0,-45 35.264389682754654,-90 45))";
const POLYGON_SOUTH: &str = "POLYGON((-90 0,-90 -45,-45 -35.264389682754654,-45 0,-90 0))";

fn write_feature_file(dir: &Path, features: &[(&str, &str)]) {
    fs::create_dir_all(dir).unwrap();
    let mut file = fs::File::create(dir.join("features.nt")).unwrap();
    for (iri, wkt) in features {
        writeln!(
            file,
            "<{iri}> <http://www.opengis.net/ont/geosparql#hasGeometry> <{iri}/geom> ."
        )
        .unwrap();
        writeln!(
            file,
            "<{iri}/geom> <http://www.opengis.net/ont/geosparql#asWKT> \"{wkt}\" ."
        )
        .unwrap();
    }
}

fn output_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}

// Subject and object of an all-IRI N-Triples statement.
fn parse_iri_statement(line: &str) -> Option<(String, String, String)> {
    let mut parts = line.split_whitespace();
    let subject = parts.next()?.trim_matches(['<', '>']).to_string();
    let predicate = parts.next()?.trim_matches(['<', '>']).to_string();
    let object = parts.next()?;
    if !object.starts_with('<') {
        return None;
    }
    Some((subject, predicate, object.trim_matches(['<', '>']).to_string()))
}

#[test]
fn level_mode_covers_the_level_exactly_once() {
    let out = tempfile::tempdir().unwrap();
    generate_level(LevelConfig {
        level: 0,
        format: RdfFormat::Nt,
        batch_size: 2,
        target_parent_level: None,
        output_path: out.path().to_path_buf(),
        pool_size: Some(2),
    })
    .unwrap();

    let files = output_files(&out.path().join("level_0"));
    assert_eq!(files.len(), 3);

    let face_class = format!("<{}>", ont::cell_class(0));
    let mut described: BTreeSet<String> = BTreeSet::new();
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        for line in content.lines() {
            if line.contains(&format!("<{}>", ont::RDF_TYPE)) && line.contains(&face_class) {
                let (subject, _, _) = parse_iri_statement(line).unwrap();
                // No cell is described twice across files.
                assert!(described.insert(subject));
            }
        }
    }
    let expected: BTreeSet<String> = cellgraph::CellId::iter_at_level(0)
        .map(ont::cell_iri)
        .collect();
    assert_eq!(described, expected);
}

#[test]
fn integrate_mode_pairs_every_relation() {
    let input = tempfile::tempdir().unwrap();
    let geometry_dir = input.path().join("geo");
    write_feature_file(
        &geometry_dir,
        &[
            ("http://example.com/area", POLYGON_NORTH),
            ("http://example.com/p1", "POINT(-118.25 34.05)"),
        ],
    );

    let out = tempfile::tempdir().unwrap();
    integrate(IntegrateConfig {
        compressed: false,
        geometry_path: geometry_dir.clone(),
        output_path: out.path().to_path_buf(),
        tolerance: 1e-1,
        min_level: 2,
        max_level: 3,
        format: RdfFormat::Nt,
        flush_threshold: Some(1_000),
        pool_size: Some(1),
    })
    .unwrap();

    let files = output_files(&out.path().join("geo"));
    assert!(!files.is_empty());
    assert!(files.iter().all(|f| {
        let name = f.file_name().unwrap().to_str().unwrap();
        name.starts_with("triples_") && name.ends_with(".nt")
    }));

    let mut statements: BTreeSet<(String, String, String)> = BTreeSet::new();
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        assert!(content.lines().count() <= 1_000);
        statements.extend(content.lines().filter_map(parse_iri_statement));
    }
    assert!(!statements.is_empty());

    for (subject, predicate, object) in &statements {
        let converse = match predicate.as_str() {
            p if p == ont::SF_CONTAINS => ont::SF_WITHIN,
            p if p == ont::SF_WITHIN => ont::SF_CONTAINS,
            p if p == ont::SF_OVERLAPS => ont::SF_OVERLAPS,
            p if p == ont::SF_CROSSES => ont::SF_CROSSES,
            other => panic!("unexpected predicate {other}"),
        };
        assert!(
            statements.contains(&(object.clone(), converse.to_string(), subject.clone())),
            "missing converse of ({subject}, {predicate}, {object})"
        );
    }

    // The point feature relates to the cell one level above its leaf.
    let enclosing = cellgraph::CellId::from_point(34.05, -118.25).parent().unwrap();
    assert!(statements.contains(&(
        "http://example.com/p1".to_string(),
        ont::SF_WITHIN.to_string(),
        ont::cell_iri(enclosing),
    )));
}

#[test]
fn integrate_mode_compressed_layout() {
    let input = tempfile::tempdir().unwrap();
    let geometry_dir = input.path().join("regions");
    write_feature_file(&geometry_dir, &[("http://example.com/area", POLYGON_NORTH)]);

    let out = tempfile::tempdir().unwrap();
    integrate(IntegrateConfig {
        compressed: true,
        geometry_path: geometry_dir,
        output_path: out.path().to_path_buf(),
        tolerance: 1e-1,
        min_level: 2,
        max_level: 3,
        format: RdfFormat::Nt,
        flush_threshold: None,
        pool_size: Some(1),
    })
    .unwrap();

    let compressed_dir = out.path().join("regions_compressed");
    assert!(compressed_dir.is_dir());
    assert!(!output_files(&compressed_dir).is_empty());
}

#[test]
fn overlap_mode_emits_homogeneous_cells_per_batch() {
    let input = tempfile::tempdir().unwrap();
    let geometry_dir = input.path().join("geo");
    write_feature_file(
        &geometry_dir,
        &[
            ("http://example.com/north", POLYGON_NORTH),
            ("http://example.com/south", POLYGON_SOUTH),
        ],
    );

    let out = tempfile::tempdir().unwrap();
    generate_overlap(OverlapConfig {
        geometry_path: geometry_dir,
        output_path: out.path().to_path_buf(),
        tolerance: 1e-1,
        min_level: 1,
        max_level: 1,
        format: RdfFormat::Nt,
        batch_size: 1,
        pool_size: Some(1),
    })
    .unwrap();

    let files = output_files(&out.path().join("level_1"));
    assert!(!files.is_empty());

    let mut described = 0usize;
    for file in &files {
        let content = fs::read_to_string(file).unwrap();
        for line in content.lines() {
            if line.contains(&format!("<{}>", ont::RDF_TYPE)) && line.contains("S2Cell_Level") {
                let (_, _, class) = parse_iri_statement(line).unwrap();
                assert_eq!(class, ont::cell_class(1));
                described += 1;
            }
        }
    }
    // Each batch at least covers the cell its polygon coincides with.
    assert!(described >= 2);
}

#[test]
fn overlap_mode_writes_one_file_per_batch() {
    let input = tempfile::tempdir().unwrap();
    let geometry_dir = input.path().join("geo");
    write_feature_file(
        &geometry_dir,
        &[
            ("http://example.com/a", "POLYGON((5 5,15 5,15 15,5 15,5 5))"),
            (
                "http://example.com/b",
                "POLYGON((-60 -15,-50 -15,-50 -5,-60 -5,-60 -15))",
            ),
        ],
    );

    let out = tempfile::tempdir().unwrap();
    generate_overlap(OverlapConfig {
        geometry_path: geometry_dir,
        output_path: out.path().to_path_buf(),
        tolerance: 1e-1,
        min_level: 4,
        max_level: 4,
        format: RdfFormat::Nt,
        batch_size: 1,
        pool_size: Some(1),
    })
    .unwrap();

    let files = output_files(&out.path().join("level_4"));
    assert_eq!(files.len(), 2);
}
