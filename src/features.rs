use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use geo_types::Geometry;
use regex::Regex;
use tracing::{debug, warn};
use wkt::TryFromWkt;

use crate::error::Result;

/// A feature joined out of the input triples: its IRI and parsed geometry.
#[derive(Debug, Clone)]
pub struct GeometricFeature {
    pub iri: String,
    pub geometry: Geometry<f64>,
}

/// One raw `?feature geo:hasGeometry / geo:asWKT` join result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub feature_iri: String,
    pub wkt: String,
}

/**
 * Reads geometry features out of a directory of RDF files. Statements are
 * matched line by line: `?feature geo:hasGeometry ?geometry` rows joined
 * with `?geometry geo:asWKT "..."` rows, with the geosparql predicates
 * accepted in full-IRI or `geo:`-prefixed form. Files that yield nothing
 * simply contribute nothing; malformed WKT is logged and skipped.
 */
#[derive(Debug)]
pub struct GeometricFeatures {
    path: PathBuf,
    has_geometry: Regex,
    as_wkt: Regex,
}

impl GeometricFeatures {
    pub fn new(path: impl Into<PathBuf>) -> GeometricFeatures {
        let iri_or_name = r"(<[^>]+>|\S+)";
        let has_geometry = format!(
            r#"^\s*{iri_or_name}\s+(?:<http://www\.opengis\.net/ont/geosparql#hasGeometry>|geo:hasGeometry)\s+{iri_or_name}"#
        );
        let as_wkt = format!(
            r#"^\s*{iri_or_name}\s+(?:<http://www\.opengis\.net/ont/geosparql#asWKT>|geo:asWKT)\s+"((?:[^"\\]|\\.)*)""#
        );
        GeometricFeatures {
            path: path.into(),
            has_geometry: Regex::new(&has_geometry).expect("statement pattern is well formed"),
            as_wkt: Regex::new(&as_wkt).expect("statement pattern is well formed"),
        }
    }

    /**
     * The raw feature/WKT join across every file under the input directory,
     * in file-then-statement order.
     */
    pub fn records(&self) -> Result<Vec<FeatureRecord>> {
        let mut joins: Vec<(String, String)> = Vec::new();
        let mut wkts: HashMap<String, String> = HashMap::new();
        for file in walk_files(&self.path)? {
            debug!(file = %file.display(), "scanning geometry file");
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(err) => {
                    warn!(file = %file.display(), %err, "skipping unreadable geometry file");
                    continue;
                }
            };
            for line in content.lines() {
                if let Some(captures) = self.has_geometry.captures(line) {
                    joins.push((strip_brackets(&captures[1]), strip_brackets(&captures[2])));
                } else if let Some(captures) = self.as_wkt.captures(line) {
                    wkts.insert(strip_brackets(&captures[1]), unescape(&captures[2]));
                }
            }
        }
        let records = joins
            .into_iter()
            .filter_map(|(feature_iri, geometry)| {
                let wkt = wkts.get(&geometry)?;
                Some(FeatureRecord {
                    feature_iri,
                    wkt: wkt.clone(),
                })
            })
            .collect();
        Ok(records)
    }

    /**
     * All parseable features, fully materialized so they can be fanned out
     * to workers. A record whose WKT does not parse is reported and dropped.
     */
    pub fn features(&self) -> Result<Vec<GeometricFeature>> {
        let mut features = Vec::new();
        for record in self.records()? {
            match Geometry::<f64>::try_from_wkt_str(&record.wkt) {
                Ok(geometry) => features.push(GeometricFeature {
                    iri: record.feature_iri,
                    geometry,
                }),
                Err(err) => {
                    warn!(feature = %record.feature_iri, %err, "skipping feature with malformed WKT");
                }
            }
        }
        Ok(features)
    }
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        entries.sort();
        for path in entries {
            if path.is_dir() {
                stack.push(path);
            } else if path.file_name().is_some_and(|name| name != ".DS_Store") {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn strip_brackets(token: &str) -> String {
    token
        .strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(token)
        .to_string()
}

fn unescape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => break,
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_fixture(dir: &Path, name: &str, body: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn joins_features_with_their_wkt() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "features.nt",
            concat!(
                "<http://example.com/a> <http://www.opengis.net/ont/geosparql#hasGeometry> <http://example.com/a/geom> .\n",
                "<http://example.com/a/geom> <http://www.opengis.net/ont/geosparql#asWKT> \"POINT(-118.25 34.05)\" .\n",
            ),
        );
        let records = GeometricFeatures::new(dir.path()).records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].feature_iri, "http://example.com/a");
        assert_eq!(records[0].wkt, "POINT(-118.25 34.05)");
    }

    #[test]
    fn prefixed_statements_and_bad_wkt() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "features.ttl",
            concat!(
                "ex:b geo:hasGeometry ex:bg .\n",
                "ex:bg geo:asWKT \"POLYGON((0 0, 1 0, 1 1, 0 1, 0 0))\" .\n",
                "ex:c geo:hasGeometry ex:cg .\n",
                "ex:cg geo:asWKT \"POLYGON((not wkt\" .\n",
            ),
        );
        let reader = GeometricFeatures::new(dir.path());
        assert_eq!(reader.records().unwrap().len(), 2);

        // The malformed WKT is skipped, not fatal.
        let features = reader.features().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].iri, "ex:b");
        assert!(matches!(features[0].geometry, Geometry::Polygon(_)));
    }
}
