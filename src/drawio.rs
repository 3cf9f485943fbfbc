//! draw.io document writer and reader.
//!
//! Cells are accumulated in a [`GeneratorContext`] and wrapped in an
//! `<mxfile>` envelope by [`GeneratorContext::finish`]. [`inspect`] reads a
//! document back, inflating a compressed diagram body when needed.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use rand::Rng;

use crate::config::ConvertOptions;
use crate::error::DecodeError;
use crate::layout::LayoutPos;
use crate::xml::escape_attr;

const ID_PREFIX_LEN: usize = 20;
/// Ids 0 and 1 are the root cell and the default layer.
const FIRST_CELL_ID: usize = 2;
const LAYER_ID: &str = "1";

const GRAPH_MODEL_ATTRS: &str = r#"dx="1422" dy="794" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="1169" pageHeight="827" math="0" shadow="0""#;

fn random_prefix() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(ID_PREFIX_LEN)
        .map(char::from)
        .collect()
}

/// Coordinates are written with at most one decimal.
fn num(value: f32) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

fn point(x: f32, y: f32, role: Option<&str>) -> String {
    match role {
        Some(role) => format!(r#"<mxPoint x="{}" y="{}" as="{}"/>"#, num(x), num(y), role),
        None => format!(r#"<mxPoint x="{}" y="{}"/>"#, num(x), num(y)),
    }
}

/// Explicit edge geometry, for edges whose route is fixed by the layout.
#[derive(Debug, Clone, Default)]
pub struct EdgeGeometry {
    pub source_point: Option<(f32, f32)>,
    pub target_point: Option<(f32, f32)>,
    pub waypoints: Vec<(f32, f32)>,
}

/// Per-document generation state: id issuance and the emitted cells.
#[derive(Debug)]
pub struct GeneratorContext {
    prefix: String,
    counter: usize,
    cells: Vec<String>,
}

impl Default for GeneratorContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorContext {
    /// A fresh context with a new random id prefix.
    pub fn new() -> Self {
        Self::with_prefix(random_prefix())
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: FIRST_CELL_ID,
            cells: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.counter);
        self.counter += 1;
        id
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn add_vertex(&mut self, value: &str, style: &str, pos: &LayoutPos) -> String {
        let id = self.next_id();
        self.cells.push(format!(
            r#"<mxCell id="{}" value="{}" style="{}" vertex="1" parent="{}"><mxGeometry x="{}" y="{}" width="{}" height="{}" as="geometry"/></mxCell>"#,
            id,
            escape_attr(value),
            escape_attr(style),
            LAYER_ID,
            num(pos.x),
            num(pos.y),
            num(pos.width),
            num(pos.height),
        ));
        id
    }

    pub fn add_edge(&mut self, source: &str, target: &str, value: &str, style: &str) -> String {
        self.add_edge_with(source, target, value, style, &EdgeGeometry::default())
    }

    pub fn add_edge_with(
        &mut self,
        source: &str,
        target: &str,
        value: &str,
        style: &str,
        geometry: &EdgeGeometry,
    ) -> String {
        let id = self.next_id();

        let mut inner = String::new();
        if let Some((x, y)) = geometry.source_point {
            inner.push_str(&point(x, y, Some("sourcePoint")));
        }
        if let Some((x, y)) = geometry.target_point {
            inner.push_str(&point(x, y, Some("targetPoint")));
        }
        if !geometry.waypoints.is_empty() {
            inner.push_str(r#"<Array as="points">"#);
            for &(x, y) in &geometry.waypoints {
                inner.push_str(&point(x, y, None));
            }
            inner.push_str("</Array>");
        }
        let geometry_xml = if inner.is_empty() {
            r#"<mxGeometry relative="1" as="geometry"/>"#.to_string()
        } else {
            format!(r#"<mxGeometry relative="1" as="geometry">{}</mxGeometry>"#, inner)
        };

        self.cells.push(format!(
            r#"<mxCell id="{}" value="{}" style="{}" edge="1" parent="{}" source="{}" target="{}">{}</mxCell>"#,
            id,
            escape_attr(value),
            escape_attr(style),
            LAYER_ID,
            escape_attr(source),
            escape_attr(target),
            geometry_xml,
        ));
        id
    }

    /// Wrap the emitted cells in a complete `<mxfile>` document.
    pub fn finish(self, options: &ConvertOptions) -> String {
        debug!(cells = self.cells.len(), compressed = options.compressed; "Writing document");
        render_document(&self.cells.concat(), &self.prefix, options)
    }
}

fn render_graph_model(cells: &str) -> String {
    format!(
        r#"<mxGraphModel {}><root><mxCell id="0"/><mxCell id="{}" parent="0"/>{}</root></mxGraphModel>"#,
        GRAPH_MODEL_ATTRS, LAYER_ID, cells
    )
}

fn render_document(cells: &str, diagram_id: &str, options: &ConvertOptions) -> String {
    let model = render_graph_model(cells);
    let body = if options.compressed {
        match compress_diagram(&model) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(error:% = err; "Compression failed, embedding diagram uncompressed");
                model
            }
        }
    } else {
        model
    };

    format!(
        r#"<mxfile host="plantdraw" agent="plantdraw {}" type="device"><diagram id="{}" name="{}">{}</diagram></mxfile>"#,
        env!("CARGO_PKG_VERSION"),
        escape_attr(diagram_id),
        escape_attr(&options.diagram_name),
        body
    )
}

/// Raw DEFLATE, no zlib header or trailer.
pub fn deflate_raw(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    encoder.finish()
}

pub fn inflate_raw(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut inflated = Vec::new();
    decoder.read_to_end(&mut inflated)?;
    Ok(inflated)
}

/// base64(deflate-raw(model)), the compressed `<diagram>` body.
pub fn compress_diagram(model: &str) -> std::io::Result<String> {
    Ok(STANDARD.encode(deflate_raw(model.as_bytes())?))
}

pub fn decompress_diagram(payload: &str) -> Result<String, DecodeError> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD.decode(compact)?;
    Ok(String::from_utf8(inflate_raw(&decoded)?)?)
}

// ============================================
// Document inspection
// ============================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellSummary {
    pub id: String,
    pub value: Option<String>,
    pub parent: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    pub vertex: bool,
    pub edge: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GraphSummary {
    pub diagrams: usize,
    pub compressed: bool,
    pub cells: Vec<CellSummary>,
}

impl GraphSummary {
    pub fn vertices(&self) -> impl Iterator<Item = &CellSummary> {
        self.cells.iter().filter(|c| c.vertex)
    }

    pub fn edges(&self) -> impl Iterator<Item = &CellSummary> {
        self.cells.iter().filter(|c| c.edge)
    }

    pub fn cell(&self, id: &str) -> Option<&CellSummary> {
        self.cells.iter().find(|c| c.id == id)
    }

    /// Vertex cell ids, looked up by label.
    pub fn vertex_by_value(&self, value: &str) -> Option<&CellSummary> {
        self.vertices().find(|c| c.value.as_deref() == Some(value))
    }
}

fn read_cell(e: &BytesStart) -> Result<CellSummary, DecodeError> {
    let mut cell = CellSummary::default();
    for attr in e.attributes() {
        let attr = attr?;
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw)?.into_owned();
        match attr.key.as_ref() {
            b"id" => cell.id = value,
            b"value" => cell.value = Some(value),
            b"parent" => cell.parent = Some(value),
            b"source" => cell.source = Some(value),
            b"target" => cell.target = Some(value),
            b"vertex" => cell.vertex = value == "1",
            b"edge" => cell.edge = value == "1",
            _ => {}
        }
    }
    Ok(cell)
}

/// Scan an XML text for `mxCell` elements. Returns the number of
/// `<diagram>` elements seen and any non-blank diagram text payloads.
fn scan(xml: &str, cells: &mut Vec<CellSummary>) -> Result<(usize, Vec<String>), DecodeError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut diagrams = 0;
    let mut in_diagram = false;
    let mut payloads = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"diagram" => {
                    diagrams += 1;
                    in_diagram = true;
                }
                b"mxCell" => cells.push(read_cell(&e)?),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"diagram" => diagrams += 1,
                b"mxCell" => cells.push(read_cell(&e)?),
                _ => {}
            },
            Event::Text(t) if in_diagram => {
                let text = t.decode()?;
                if !text.trim().is_empty() {
                    payloads.push(text.into_owned());
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"diagram" {
                    in_diagram = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((diagrams, payloads))
}

/// Read a generated document back into a flat list of cells.
pub fn inspect(document: &str) -> Result<GraphSummary, DecodeError> {
    let mut cells = Vec::new();
    let (diagrams, payloads) = scan(document, &mut cells)?;
    if diagrams == 0 {
        return Err(DecodeError::MissingDiagram);
    }

    let compressed = !payloads.is_empty();
    for payload in payloads {
        let model = decompress_diagram(&payload)?;
        scan(&model, &mut cells)?;
    }

    Ok(GraphSummary {
        diagrams,
        compressed,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn sample(ctx: &mut GeneratorContext) -> (String, String) {
        let a = ctx.add_vertex("A", "rounded=1;", &LayoutPos::new(10.0, 20.0, 120.0, 40.0));
        let b = ctx.add_vertex("B", "rounded=1;", &LayoutPos::new(200.0, 20.0, 120.0, 40.0));
        ctx.add_edge(&a, &b, "uses", "endArrow=open;");
        (a, b)
    }

    #[test]
    fn ids_share_one_counter_starting_at_two() {
        let mut ctx = GeneratorContext::with_prefix("p");
        assert_eq!(ctx.next_id(), "p-2");
        let (a, b) = sample(&mut ctx);
        assert_eq!((a.as_str(), b.as_str()), ("p-3", "p-4"));
        assert_eq!(ctx.next_id(), "p-6");
    }

    #[test]
    fn random_prefix_is_alphanumeric() {
        let ctx = GeneratorContext::new();
        assert_eq!(ctx.prefix().len(), ID_PREFIX_LEN);
        assert!(ctx.prefix().chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(ctx.prefix(), GeneratorContext::new().prefix());
    }

    #[test]
    fn uncompressed_document_has_reserved_cells() {
        let mut ctx = GeneratorContext::with_prefix("abc");
        let (a, b) = sample(&mut ctx);
        let doc = ctx.finish(&ConvertOptions::default());
        assert!(doc.starts_with("<mxfile"));
        assert!(doc.contains(r#"name="Page-1""#));

        let summary = inspect(&doc).unwrap();
        assert_eq!(summary.diagrams, 1);
        assert!(!summary.compressed);
        assert_eq!(summary.cells.len(), 5);
        assert_eq!(summary.cells[0].id, "0");
        assert_eq!(summary.cells[1].parent.as_deref(), Some("0"));

        let edge = summary.edges().next().unwrap();
        assert_eq!(edge.source.as_deref(), Some(a.as_str()));
        assert_eq!(edge.target.as_deref(), Some(b.as_str()));
        assert_eq!(summary.vertices().count(), 2);

        let ids: HashSet<_> = summary.cells.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), summary.cells.len());
        for cell in &summary.cells[1..] {
            assert!(ids.contains(cell.parent.as_deref().unwrap()));
        }
    }

    #[test]
    fn compressed_document_decodes_to_same_cells() {
        let mut plain_ctx = GeneratorContext::with_prefix("same");
        sample(&mut plain_ctx);
        let mut packed_ctx = GeneratorContext::with_prefix("same");
        sample(&mut packed_ctx);

        let plain = inspect(&plain_ctx.finish(&ConvertOptions::default())).unwrap();
        let packed_doc = packed_ctx.finish(&ConvertOptions {
            compressed: true,
            ..ConvertOptions::default()
        });
        assert!(!packed_doc.contains("<mxGraphModel"));

        let packed = inspect(&packed_doc).unwrap();
        assert!(packed.compressed);
        assert_eq!(plain.cells, packed.cells);
    }

    #[test]
    fn deflate_round_trip_is_exact() {
        let model = render_graph_model(r#"<mxCell id="x-2" value="ü &amp; ß" vertex="1" parent="1"/>"#);
        let packed = deflate_raw(model.as_bytes()).unwrap();
        assert_eq!(inflate_raw(&packed).unwrap(), model.as_bytes());
        assert_eq!(decompress_diagram(&compress_diagram(&model).unwrap()).unwrap(), model);
    }

    #[test]
    fn values_are_escaped_and_read_back() {
        let mut ctx = GeneratorContext::with_prefix("esc");
        ctx.add_vertex("a<b> & \"c\"\nnext", "", &LayoutPos::new(0.0, 0.0, 10.0, 10.0));
        let doc = ctx.finish(&ConvertOptions::default());
        assert!(doc.contains("a&lt;b&gt; &amp; &quot;c&quot;&#10;next"));

        let summary = inspect(&doc).unwrap();
        assert_eq!(
            summary.vertices().next().unwrap().value.as_deref(),
            Some("a<b> & \"c\"\nnext")
        );
    }

    #[test]
    fn document_without_diagram_is_rejected() {
        assert!(matches!(
            inspect("<mxfile></mxfile>"),
            Err(DecodeError::MissingDiagram)
        ));
    }

    #[test]
    fn coordinates_are_rounded() {
        assert_eq!(num(40.0), "40");
        assert_eq!(num(93.333_336), "93.3");
        assert_eq!(num(-0.01), "0");
    }
}
