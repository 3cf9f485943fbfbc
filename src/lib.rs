//! Compile PlantUML-style diagram text into draw.io documents.
//!
//! [`convert`] is the entry point: it detects whether the source uses the
//! architecture (C4) macros or one of the eight PlantUML dialects, parses
//! it, lays it out and returns a complete `<mxfile>` document. The
//! [`encode`] module builds image-service URLs for PlantUML and Mermaid
//! sources instead.

pub mod c4;
pub mod config;
pub mod drawio;
pub mod encode;
pub mod error;
pub mod layout;
pub mod plantuml;
pub mod xml;

use log::info;

pub use config::{Config, ConvertOptions, ImageFormat};
pub use error::{ConfigError, ConvertError, DecodeError, EncodeError};

/// Convert diagram source into a draw.io document.
///
/// Whitespace-only input is rejected; anything else produces a document,
/// possibly a nearly empty one for text no parser recognises.
pub fn convert(source: &str, options: &ConvertOptions) -> Result<String, ConvertError> {
    if source.trim().is_empty() {
        return Err(ConvertError::EmptySource);
    }

    if c4::detect(source) {
        info!(notation = "c4", compressed = options.compressed; "Converting diagram");
        let diagram = c4::parse(source);
        return Ok(c4::generate(&diagram, options));
    }

    let diagram = plantuml::parse_plantuml(source);
    info!(notation:% = diagram.dialect(), compressed = options.compressed; "Converting diagram");
    Ok(plantuml::generate(&diagram, options))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::drawio::{GraphSummary, inspect};
    use proptest::prelude::*;

    fn convert_and_inspect(source: &str, compressed: bool) -> GraphSummary {
        let options = ConvertOptions {
            compressed,
            ..ConvertOptions::default()
        };
        inspect(&convert(source, &options).unwrap()).unwrap()
    }

    fn assert_envelope(summary: &GraphSummary) {
        assert_eq!(summary.diagrams, 1);
        let ids: Vec<&str> = summary.cells.iter().map(|c| c.id.as_str()).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len(), "duplicate cell ids");
        assert_eq!(ids.iter().filter(|id| **id == "0" || **id == "1").count(), 2);
        for cell in &summary.cells {
            if let Some(parent) = &cell.parent {
                assert!(unique.contains(parent.as_str()), "dangling parent {}", parent);
            }
        }
    }

    const SAMPLES: &[&str] = &[
        "@startuml\nclass A\nclass B\nA --> B\n@enduml",
        "participant A\nparticipant B\nA -> B : hi\nalt ok\nB --> A : yes\nelse\nB --> A : no\nend",
        "start\n|Lane|\n:Do X;\nif (ok?) then (yes)\n:Y;\nelse (no)\n:N;\nendif\nstop",
        "[*] --> Idle\nIdle --> Busy : go\nBusy --> [*]",
        "actor User\nrectangle Shop {\n(Buy)\n}\nUser --> (Buy)",
        "@startmindmap\n* Root\n** A\n*** A1\n-- B\n@endmindmap",
        "entity User {\n*id : int\n--\nname : text\n}\nUser ||--o{ Post : writes",
        "node web\ndatabase db\ncloud cdn\ncdn --> web\nweb ..> db",
        "System(s1,\"Sys\"){ Container(c1,\"App\") }\nRel(s1,c1,\"contains\",\"\")",
    ];

    #[test]
    fn test_empty_source_is_rejected() {
        let options = ConvertOptions::default();
        assert!(matches!(convert("", &options), Err(ConvertError::EmptySource)));
        assert!(matches!(convert(" \n\t\n", &options), Err(ConvertError::EmptySource)));
    }

    #[test]
    fn test_every_notation_produces_a_sound_envelope() {
        for source in SAMPLES {
            let summary = convert_and_inspect(source, false);
            assert_envelope(&summary);
            assert!(summary.vertices().count() > 0, "no vertices for {:?}", source);
        }
    }

    #[test]
    fn test_edges_reference_existing_vertices() {
        for source in SAMPLES {
            let summary = convert_and_inspect(source, false);
            for edge in summary.edges() {
                for end in [&edge.source, &edge.target] {
                    let id = end.as_deref().unwrap();
                    assert!(summary.cell(id).is_some_and(|c| c.vertex));
                }
            }
        }
    }

    #[test]
    fn test_compressed_and_plain_documents_decode_to_the_same_graph() {
        for source in SAMPLES {
            let plain = convert_and_inspect(source, false);
            let packed = convert_and_inspect(source, true);
            assert!(packed.compressed);
            assert!(!plain.compressed);

            let shape = |s: &GraphSummary| -> Vec<(Option<String>, bool, bool)> {
                s.cells
                    .iter()
                    .map(|c| (c.value.clone(), c.vertex, c.edge))
                    .collect()
            };
            assert_eq!(shape(&plain), shape(&packed));
        }
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let document = convert(
            "class A {\n+ tag : Map<K, \"V\"> & more\n}",
            &ConvertOptions::default(),
        )
        .unwrap();
        assert!(!document.contains("Map<K"));
        let summary = inspect(&document).unwrap();
        let value = summary.vertices().next().unwrap().value.clone().unwrap();
        assert!(value.contains("Map&lt;K, &quot;V&quot;&gt; &amp; more"));

        let document = convert("start\n:a < b & \"c\" > d;\nstop", &ConvertOptions::default()).unwrap();
        let summary = inspect(&document).unwrap();
        assert!(summary.vertex_by_value("a < b & \"c\" > d").is_some());
    }

    #[test]
    fn test_class_scenario() {
        let summary = convert_and_inspect("@startuml\nclass A\nclass B\nA --> B\n@enduml", false);
        let vertices: Vec<_> = summary.vertices().map(|v| v.id.clone()).collect();
        let edges: Vec<_> = summary.edges().collect();
        assert_eq!(vertices.len(), 2);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source.as_ref(), Some(&vertices[0]));
        assert_eq!(edges[0].target.as_ref(), Some(&vertices[1]));
    }

    #[test]
    fn test_activity_branches_meet_at_one_merge() {
        let summary = convert_and_inspect(
            "start\nif (A) then (yes)\n:Yes path;\nelse (B)\n:B path;\nendif\nstop",
            false,
        );
        let decision = &summary.vertex_by_value("A").unwrap().id;
        let yes = &summary.vertex_by_value("Yes path").unwrap().id;
        let no = &summary.vertex_by_value("B path").unwrap().id;

        let targets = |from: &str| -> Vec<String> {
            summary
                .edges()
                .filter(|e| e.source.as_deref() == Some(from))
                .filter_map(|e| e.target.clone())
                .collect()
        };
        assert_eq!(targets(decision), vec![yes.clone(), no.clone()]);
        let (after_yes, after_no) = (targets(yes), targets(no));
        assert_eq!(after_yes.len(), 1);
        assert_eq!(after_yes, after_no);
    }

    #[test]
    fn test_mindmap_scenario() {
        let summary = convert_and_inspect("* Root\n** Child1\n** Child2", false);
        let root = &summary.vertex_by_value("Root").unwrap().id;
        let children: Vec<_> = summary
            .edges()
            .filter(|e| e.source.as_deref() == Some(root.as_str()))
            .collect();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_c4_scenario() {
        let summary = convert_and_inspect(
            "System(s1,\"Sys\")\nContainer(c1,\"App\")\nSystem(s1){ Container(c1,\"App\") }\nRel(s1,c1,\"contains\",\"\")",
            false,
        );
        assert_eq!(summary.vertices().count(), 4);
        let edges: Vec<_> = summary.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].value.as_deref(), Some("contains"));
    }

    #[test]
    fn test_each_document_gets_a_fresh_prefix() {
        let options = ConvertOptions::default();
        let a = inspect(&convert("class A", &options).unwrap()).unwrap();
        let b = inspect(&convert("class A", &options).unwrap()).unwrap();
        assert_ne!(a.vertices().next().unwrap().id, b.vertices().next().unwrap().id);
    }

    proptest! {
        #[test]
        fn arbitrary_text_never_breaks_the_envelope(source in "[ -~\n]{1,200}") {
            prop_assume!(!source.trim().is_empty());
            let document = convert(&source, &ConvertOptions::default()).unwrap();
            let summary = inspect(&document).unwrap();
            prop_assert_eq!(summary.diagrams, 1);
            let ids: HashSet<&str> = summary.cells.iter().map(|c| c.id.as_str()).collect();
            prop_assert_eq!(ids.len(), summary.cells.len());
        }
    }
}
