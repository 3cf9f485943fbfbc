mod activity;
mod class;
mod deployment;
mod er;
mod mindmap;
mod sequence;
mod state;
mod usecase;

pub use activity::{build_activity_edges, parse_activity};
pub use class::parse_class;
pub use deployment::parse_deployment;
pub use er::parse_er;
pub use mindmap::parse_mindmap;
pub use sequence::parse_sequence;
pub use state::parse_state;
pub use usecase::parse_usecase;

use log::debug;

use super::classify::{Dialect, classify};
use super::normalize::normalize;
use super::types::*;

/// A parsed diagram, one variant per dialect.
#[derive(Debug, Clone)]
pub enum ParsedDiagram {
    Class(ClassDiagram),
    Sequence(SequenceDiagram),
    Activity(ActivityDiagram),
    State(StateDiagram),
    Usecase(UsecaseDiagram),
    Mindmap(MindmapDiagram),
    Er(ErDiagram),
    Deployment(DeploymentDiagram),
}

impl ParsedDiagram {
    pub fn dialect(&self) -> Dialect {
        match self {
            ParsedDiagram::Class(_) => Dialect::Class,
            ParsedDiagram::Sequence(_) => Dialect::Sequence,
            ParsedDiagram::Activity(_) => Dialect::Activity,
            ParsedDiagram::State(_) => Dialect::State,
            ParsedDiagram::Usecase(_) => Dialect::Usecase,
            ParsedDiagram::Mindmap(_) => Dialect::Mindmap,
            ParsedDiagram::Er(_) => Dialect::Er,
            ParsedDiagram::Deployment(_) => Dialect::Deployment,
        }
    }
}

/// Parse normalized lines with the parser for `dialect`.
pub fn parse(lines: &[String], dialect: Dialect) -> ParsedDiagram {
    let diagram = match dialect {
        Dialect::Class => ParsedDiagram::Class(parse_class(lines)),
        Dialect::Sequence => ParsedDiagram::Sequence(parse_sequence(lines)),
        Dialect::Activity => ParsedDiagram::Activity(parse_activity(lines)),
        Dialect::State => ParsedDiagram::State(parse_state(lines)),
        Dialect::Usecase => ParsedDiagram::Usecase(parse_usecase(lines)),
        Dialect::Mindmap => ParsedDiagram::Mindmap(parse_mindmap(lines)),
        Dialect::Er => ParsedDiagram::Er(parse_er(lines)),
        Dialect::Deployment => ParsedDiagram::Deployment(parse_deployment(lines)),
    };
    debug!(dialect:% = dialect, lines = lines.len(); "Parsed diagram");
    diagram
}

/// Normalize, classify and parse a source text.
pub fn parse_plantuml(source: &str) -> ParsedDiagram {
    let dialect = classify(source);
    debug!(dialect:% = dialect; "Classified diagram");
    parse(&normalize(source), dialect)
}

/// Strip one pair of surrounding double quotes.
pub(crate) fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Split a `"Label" as Name` / `Name as "Label"` / `Name` declaration into
/// `(name, label)`.
pub(crate) fn split_alias(decl: &str) -> (String, String) {
    let decl = decl.trim();
    if let Some((left, right)) = decl.split_once(" as ") {
        let (left, right) = (left.trim(), right.trim());
        if left.starts_with('"') {
            return (unquote(right).to_string(), unquote(left).to_string());
        }
        return (unquote(left).to_string(), unquote(right).to_string());
    }
    let name = unquote(decl).to_string();
    (name.clone(), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_in_both_directions() {
        assert_eq!(
            split_alias(r#""Long Name" as L"#),
            ("L".to_string(), "Long Name".to_string())
        );
        assert_eq!(
            split_alias(r#"L as "Long Name""#),
            ("L".to_string(), "Long Name".to_string())
        );
        assert_eq!(split_alias("Plain"), ("Plain".to_string(), "Plain".to_string()));
    }

    #[test]
    fn dispatch_matches_classification() {
        let diagram = parse_plantuml("@startuml\nclass A\nclass B\nA --> B\n@enduml");
        assert_eq!(diagram.dialect(), Dialect::Class);

        let diagram = parse_plantuml("start\n:Do X;\nstop");
        assert_eq!(diagram.dialect(), Dialect::Activity);
    }

    #[test]
    fn garbage_degrades_to_empty_class_diagram() {
        match parse_plantuml("%%% not a diagram %%%") {
            ParsedDiagram::Class(cls) => {
                assert!(cls.classes.is_empty());
                assert!(cls.relations.is_empty());
            }
            other => panic!("Expected class diagram, got {:?}", other.dialect()),
        }
    }
}
