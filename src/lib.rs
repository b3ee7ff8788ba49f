//! Converts geospatial vector features and the S2 discrete global grid into
//! an RDF knowledge graph: cells with their topology and geometry, and the
//! topological relations between user features and cells.
//!
//! The pipeline runs in three modes. `level` describes every cell of one
//! S2 level. `overlap` describes the cells that cover a set of input
//! geometries. `integrate` materializes `sfContains`/`sfWithin`,
//! `sfOverlaps`, and `sfCrosses` relations between input features and the
//! cells their geometry reaches, using saturated interior fillings and
//! buffered boundary coverings.

pub mod cell;
pub mod config;
pub mod coverer;
pub mod describe;
pub mod error;
pub mod features;
pub mod geom;
pub mod integrator;
pub mod level;
pub mod nvec;
pub mod ont;
pub mod overlap;
pub mod rdf;
pub mod region;
pub mod relate;
pub mod tiling;
pub mod writer;

pub use cell::CellId;
pub use coverer::ConstrainedCoverer;
pub use describe::CellDescriber;
pub use error::{Error, Result};
pub use features::{GeometricFeature, GeometricFeatures};
pub use rdf::{Graph, Term, Triple};
pub use relate::RelationMaterializer;
pub use tiling::Tiler;
pub use writer::RdfFormat;
