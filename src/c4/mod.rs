//! Architecture (C4) diagrams.
//!
//! A separate pipeline from the PlantUML dialects: macro calls such as
//! `System(alias, "Label")` declare elements, braces nest them and
//! `Rel(from, to, "label")` connects them.

mod generate;
mod layout;
mod parser;
mod types;

pub use generate::{entity_label, generate, render_cells};
pub use layout::{entity_size, layout_c4};
pub use parser::{detect, parse_entities, parse_relations};
pub use types::*;

/// Parse both the element tree and the relations of a source text.
pub fn parse(code: &str) -> C4Diagram {
    C4Diagram {
        entities: parse_entities(code),
        relations: parse_relations(code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_container_and_resolved_relation() {
        let src = "System(s1,\"Sys\")\nContainer(c1,\"App\")\nSystem(s1){ Container(c1,\"App\") }\nRel(s1,c1,\"contains\",\"\")";
        assert!(detect(src));
        let diagram = parse(src);

        let nested = diagram
            .entities
            .iter()
            .find(|e| e.alias == "s1" && !e.children.is_empty())
            .expect("nested system");
        assert_eq!(nested.children[0].alias, "c1");

        assert_eq!(diagram.relations.len(), 1);
        let flat = diagram.flatten();
        let aliases: Vec<&str> = flat.iter().map(|(_, e)| e.alias.as_str()).collect();
        let relation = &diagram.relations[0];
        assert!(aliases.contains(&relation.source.as_str()));
        assert!(aliases.contains(&relation.target.as_str()));
    }
}
