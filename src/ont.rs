//! The KnowWhereGraph vocabulary: namespaces, prefix bindings, and the IRI
//! factories for cells and their geometries. Everything here is a pure
//! function of the cell id, which is what makes output deterministic across
//! workers.

use crate::cell::CellId;

pub const KWG_ENDPOINT: &str = "http://stko-kwg.geog.ucsb.edu/";

pub const KWGR: &str = "http://stko-kwg.geog.ucsb.edu/lod/resource/";
pub const KWG_ONT: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/";
pub const GEO: &str = "http://www.opengis.net/ont/geosparql#";
pub const SF: &str = "http://www.opengis.net/ont/sf#";
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Prefix bindings emitted by the turtle-family serializers, longest
/// namespace first so compaction picks the most specific match.
pub const PREFIXES: [(&str, &str); 7] = [
    ("kwgr", KWGR),
    ("kwg-ont", KWG_ONT),
    ("geo", GEO),
    ("sf", SF),
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("xsd", XSD),
];

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
pub const XSD_FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";

pub const GEO_HAS_GEOMETRY: &str = "http://www.opengis.net/ont/geosparql#hasGeometry";
pub const GEO_HAS_DEFAULT_GEOMETRY: &str = "http://www.opengis.net/ont/geosparql#hasDefaultGeometry";
pub const GEO_HAS_METRIC_AREA: &str = "http://www.opengis.net/ont/geosparql#hasMetricArea";
pub const GEO_AS_WKT: &str = "http://www.opengis.net/ont/geosparql#asWKT";
pub const GEO_WKT_LITERAL: &str = "http://www.opengis.net/ont/geosparql#wktLiteral";
pub const GEO_GEOMETRY: &str = "http://www.opengis.net/ont/geosparql#Geometry";
pub const SF_POLYGON: &str = "http://www.opengis.net/ont/sf#Polygon";

pub const SF_EQUALS: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfEquals";
pub const SF_CONTAINS: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfContains";
pub const SF_WITHIN: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfWithin";
pub const SF_TOUCHES: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfTouches";
pub const SF_OVERLAPS: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfOverlaps";
pub const SF_CROSSES: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/sfCrosses";
pub const CELL_ID: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/cellID";
pub const VERTEX_POLYGON: &str = "http://stko-kwg.geog.ucsb.edu/lod/ontology/vertexPolygon";

/**
 * The IRI of an individual cell, in the KnowWhereGraph resource namespace.
 * A pure function of the cell's level and 64-bit id.
 */
pub fn cell_iri(cell: CellId) -> String {
    format!("{KWGR}s2.level{}.{}", cell.level(), cell.id())
}

/// The IRI of the polygon geometry attached to a cell.
pub fn cell_geometry_iri(cell: CellId) -> String {
    format!("{KWGR}geometry.polygon.s2.level{}.{}", cell.level(), cell.id())
}

/// The `kwg-ont:S2Cell_LevelN` class for a cell level.
pub fn cell_class(level: u64) -> String {
    format!("{KWG_ONT}S2Cell_Level{level}")
}

/**
 * Compacts an IRI against the prefix table, yielding e.g.
 * `kwgr:s2.level1.288230376151711744`. Returns `None` when no namespace
 * matches or the local part would not survive as a prefixed name.
 */
pub fn compact(iri: &str) -> Option<String> {
    for (prefix, namespace) in PREFIXES {
        if let Some(local) = iri.strip_prefix(namespace) {
            // Local names may carry dots medially but not terminally, and
            // anything with a slash or hash left over needs the long form.
            if local.is_empty()
                || local.ends_with('.')
                || local.contains(['/', '#', ':'])
            {
                return None;
            }
            return Some(format!("{prefix}:{local}"));
        }
    }
    None
}
