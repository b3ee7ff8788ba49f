use std::fmt::{Display, Formatter};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use clap::ValueEnum;
use tracing::debug;

use crate::error::{Error, Result};
use crate::ont;
use crate::rdf::{Graph, Term, Triple};

//==================================================
// Serialization formats.
//==================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RdfFormat {
    Ttl,
    Turtle,
    Xml,
    Nt,
    N3,
    Trix,
    Trig,
    Nq,
    Nquads,
    JsonLd,
}

impl Display for RdfFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value()
            .expect("no values are skipped")
            .get_name()
            .fmt(f)
    }
}

impl FromStr for RdfFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<RdfFormat> {
        match s {
            "ttl" => Ok(RdfFormat::Ttl),
            "turtle" => Ok(RdfFormat::Turtle),
            "xml" => Ok(RdfFormat::Xml),
            "nt" => Ok(RdfFormat::Nt),
            "n3" => Ok(RdfFormat::N3),
            "trix" => Ok(RdfFormat::Trix),
            "trig" => Ok(RdfFormat::Trig),
            "nq" => Ok(RdfFormat::Nq),
            "nquads" => Ok(RdfFormat::Nquads),
            "json-ld" => Ok(RdfFormat::JsonLd),
            other => Err(Error::InvalidConfig(format!("unknown rdf format: {other}"))),
        }
    }
}

impl RdfFormat {
    /// File extension per format. The undotted `n3` is inherited from the
    /// extension table this tool has always shipped.
    pub fn extension(self) -> &'static str {
        match self {
            RdfFormat::Ttl | RdfFormat::Turtle => ".ttl",
            RdfFormat::Xml => ".xml",
            RdfFormat::Nt => ".nt",
            RdfFormat::N3 => "n3",
            RdfFormat::Trix => ".trix",
            RdfFormat::Trig => ".trig",
            RdfFormat::Nq | RdfFormat::Nquads => ".nq",
            RdfFormat::JsonLd => ".jsonld",
        }
    }
}

//==================================================
// Byte-level serialization of a graph.
//==================================================
fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn escape_json(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            other => out.push(other),
        }
    }
    out
}

fn turtle_term(iri: &str) -> String {
    ont::compact(iri).unwrap_or_else(|| format!("<{iri}>"))
}

fn turtle_object(term: &Term) -> String {
    match term {
        Term::Iri(iri) => turtle_term(iri),
        Term::Literal { value, datatype } => {
            format!("\"{}\"^^{}", escape_literal(value), turtle_term(datatype))
        }
    }
}

fn ntriples_object(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("<{iri}>"),
        Term::Literal { value, datatype } => {
            format!("\"{}\"^^<{datatype}>", escape_literal(value))
        }
    }
}

fn write_ntriples(graph: &Graph, out: &mut dyn Write) -> io::Result<()> {
    for triple in graph {
        writeln!(
            out,
            "<{}> <{}> {} .",
            triple.subject,
            triple.predicate,
            ntriples_object(&triple.object)
        )?;
    }
    Ok(())
}

fn write_turtle(graph: &Graph, out: &mut dyn Write, as_trig: bool) -> io::Result<()> {
    for (prefix, namespace) in ont::PREFIXES {
        writeln!(out, "@prefix {prefix}: <{namespace}> .")?;
    }
    writeln!(out)?;
    if as_trig {
        writeln!(out, "{{")?;
    }
    for triple in graph {
        writeln!(
            out,
            "{} {} {} .",
            turtle_term(&triple.subject),
            turtle_term(&triple.predicate),
            turtle_object(&triple.object)
        )?;
    }
    if as_trig {
        writeln!(out, "}}")?;
    }
    Ok(())
}

// Element name and namespace declaration for a predicate, e.g.
// `geo:asWKT` with no extra declaration, or `ns0:p xmlns:ns0="..."` for a
// namespace outside the prefix table.
fn xml_predicate(iri: &str) -> (String, String) {
    if let Some(compacted) = ont::compact(iri) {
        return (compacted, String::new());
    }
    let split = iri
        .rfind(['#', '/'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let (namespace, local) = iri.split_at(split);
    (
        format!("ns0:{local}"),
        format!(" xmlns:ns0=\"{}\"", escape_xml(namespace)),
    )
}

fn write_xml(graph: &Graph, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    write!(out, "<rdf:RDF")?;
    for (prefix, namespace) in ont::PREFIXES {
        write!(out, " xmlns:{prefix}=\"{namespace}\"")?;
    }
    writeln!(out, ">")?;
    for subject in graph.subjects() {
        writeln!(
            out,
            "  <rdf:Description rdf:about=\"{}\">",
            escape_xml(subject)
        )?;
        for triple in graph.iter().filter(|t| t.subject == subject) {
            let (name, declaration) = xml_predicate(&triple.predicate);
            match &triple.object {
                Term::Iri(iri) => writeln!(
                    out,
                    "    <{name}{declaration} rdf:resource=\"{}\"/>",
                    escape_xml(iri)
                )?,
                Term::Literal { value, datatype } => writeln!(
                    out,
                    "    <{name}{declaration} rdf:datatype=\"{}\">{}</{}>",
                    escape_xml(datatype),
                    escape_xml(value),
                    name
                )?,
            }
        }
        writeln!(out, "  </rdf:Description>")?;
    }
    writeln!(out, "</rdf:RDF>")?;
    Ok(())
}

fn write_trix(graph: &Graph, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<TriX xmlns=\"http://www.w3.org/2004/03/trix/trix-1/\">")?;
    writeln!(out, "  <graph>")?;
    for triple in graph {
        writeln!(out, "    <triple>")?;
        writeln!(out, "      <uri>{}</uri>", escape_xml(&triple.subject))?;
        writeln!(out, "      <uri>{}</uri>", escape_xml(&triple.predicate))?;
        match &triple.object {
            Term::Iri(iri) => writeln!(out, "      <uri>{}</uri>", escape_xml(iri))?,
            Term::Literal { value, datatype } => writeln!(
                out,
                "      <typedLiteral datatype=\"{}\">{}</typedLiteral>",
                escape_xml(datatype),
                escape_xml(value)
            )?,
        }
        writeln!(out, "    </triple>")?;
    }
    writeln!(out, "  </graph>")?;
    writeln!(out, "</TriX>")?;
    Ok(())
}

fn json_object(term: &Term) -> String {
    match term {
        Term::Iri(iri) => format!("{{\"@id\": \"{}\"}}", escape_json(iri)),
        Term::Literal { value, datatype } => format!(
            "{{\"@value\": \"{}\", \"@type\": \"{}\"}}",
            escape_json(value),
            escape_json(datatype)
        ),
    }
}

fn write_json_ld(graph: &Graph, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "[")?;
    let subjects = graph.subjects();
    for (i, subject) in subjects.iter().enumerate() {
        writeln!(out, "  {{")?;
        write!(out, "    \"@id\": \"{}\"", escape_json(subject))?;
        let triples: Vec<&Triple> = graph.iter().filter(|t| t.subject == *subject).collect();
        let mut index = 0;
        while index < triples.len() {
            let predicate = &triples[index].predicate;
            let mut objects = Vec::new();
            while index < triples.len() && &triples[index].predicate == predicate {
                objects.push(json_object(&triples[index].object));
                index += 1;
            }
            write!(
                out,
                ",\n    \"{}\": [{}]",
                escape_json(predicate),
                objects.join(", ")
            )?;
        }
        writeln!(out)?;
        write!(out, "  }}")?;
        writeln!(out, "{}", if i + 1 < subjects.len() { "," } else { "" })?;
    }
    writeln!(out, "]")?;
    Ok(())
}

/// Serializes the graph in the requested format.
pub fn serialize_graph(graph: &Graph, format: RdfFormat, out: &mut dyn Write) -> io::Result<()> {
    match format {
        RdfFormat::Nt | RdfFormat::Nq | RdfFormat::Nquads => write_ntriples(graph, out),
        RdfFormat::Ttl | RdfFormat::Turtle | RdfFormat::N3 => write_turtle(graph, out, false),
        RdfFormat::Trig => write_turtle(graph, out, true),
        RdfFormat::Xml => write_xml(graph, out),
        RdfFormat::Trix => write_trix(graph, out),
        RdfFormat::JsonLd => write_json_ld(graph, out),
    }
}

//==================================================
// Filesystem side.
//==================================================
/// The `level_{L}` directory for a level under the output root.
pub fn level_dir(output_path: &Path, level: u64) -> PathBuf {
    output_path.join(format!("level_{level}"))
}

/**
 * Creates the directory tree output files land in, optionally nested under
 * a `level_{L}` folder. Drivers call this once before fanning out workers.
 */
pub fn create_output_path(level: Option<u64>, output_path: &Path) -> Result<()> {
    let target = match level {
        Some(level) => level_dir(output_path, level),
        None => output_path.to_path_buf(),
    };
    fs::create_dir_all(&target)?;
    Ok(())
}

/// Writes one graph to one file.
pub fn write_graph(graph: &Graph, path: &Path, format: RdfFormat) -> Result<()> {
    let start = Instant::now();
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    serialize_graph(graph, format, &mut out)?;
    out.flush()?;
    debug!(
        path = %path.display(),
        triples = graph.len(),
        elapsed = ?start.elapsed(),
        "wrote graph"
    );
    Ok(())
}

//==================================================
// Batched feature-mode output.
//==================================================
/**
 * Hands out per-worker triple sinks that spill to numbered files. The file
 * counter is shared and atomic, so names are unique across workers without
 * any other coordination.
 */
#[derive(Debug)]
pub struct BatchedWriter {
    out_dir: PathBuf,
    format: RdfFormat,
    flush_threshold: Option<usize>,
    sequence: AtomicUsize,
}

impl BatchedWriter {
    pub fn new(
        out_dir: impl Into<PathBuf>,
        format: RdfFormat,
        flush_threshold: Option<usize>,
    ) -> BatchedWriter {
        BatchedWriter {
            out_dir: out_dir.into(),
            format,
            flush_threshold,
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn sink(&self) -> TripleSink<'_> {
        TripleSink {
            writer: self,
            graph: Graph::new(),
        }
    }

    fn flush(&self, graph: &mut Graph) -> Result<()> {
        if graph.is_empty() {
            return Ok(());
        }
        let n = self.sequence.fetch_add(1, Ordering::Relaxed);
        let path = self
            .out_dir
            .join(format!("triples_{n}{}", self.format.extension()));
        write_graph(graph, &path, self.format)?;
        graph.clear();
        Ok(())
    }
}

/**
 * One worker's triple buffer. Holds at most `flush_threshold` triples; each
 * time the threshold is reached the buffer is serialized to its own file and
 * emptied. `finish` spills whatever remains, so no triple is lost.
 */
#[derive(Debug)]
pub struct TripleSink<'a> {
    writer: &'a BatchedWriter,
    graph: Graph,
}

impl TripleSink<'_> {
    pub fn insert(&mut self, triple: Triple) -> Result<()> {
        self.graph.insert(triple);
        if let Some(threshold) = self.writer.flush_threshold {
            if self.graph.len() >= threshold {
                self.writer.flush(&mut self.graph)?;
            }
        }
        Ok(())
    }

    /**
     * Adds a whole graph. The graph is never split across files, so converse
     * relation pairs stay together; if it would push the buffer past the
     * threshold the buffer is spilled first. A graph larger than the
     * threshold becomes a file of its own.
     */
    pub fn extend(&mut self, graph: Graph) -> Result<()> {
        if let Some(threshold) = self.writer.flush_threshold {
            if !self.graph.is_empty() && self.graph.len() + graph.len() > threshold {
                self.writer.flush(&mut self.graph)?;
            }
        }
        self.graph.merge(graph);
        if let Some(threshold) = self.writer.flush_threshold {
            if self.graph.len() >= threshold {
                self.writer.flush(&mut self.graph)?;
            }
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush(&mut self.graph)
    }
}
