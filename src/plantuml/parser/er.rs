use std::sync::LazyLock;

use regex::Regex;

use super::{split_alias, unquote};
use crate::plantuml::types::*;

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^entity\s+("[^"]+"(?:\s+as\s+[\w.]+)?|[\w.]+(?:\s+as\s+"[^"]+")?)\s*(?:<<\w+>>)?\s*(?:#\w+)?\s*(\{)?\s*(\})?$"#,
    )
    .unwrap()
});

static RELATIONSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<from>"[^"]+"|[\w.]+)\s*(?P<left>\|o|\|\||\}o|\}\||o\||\|\{|o\{)(?:-+|\.+)(?P<right>o\||\|\||o\{|\|\{|\|o|\}o|\}\|)\s*(?P<to>"[^"]+"|[\w.]+)\s*(?::\s*(?P<label>.*))?$"#,
    )
    .unwrap()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<<\s*(\w+)\s*>>").unwrap());

/// Crow's-foot end marker to a cardinality label.
fn cardinality(marker: &str) -> &'static str {
    let many = marker.contains('{') || marker.contains('}');
    let optional = marker.contains('o');
    match (many, optional) {
        (false, false) => "1",
        (false, true) => "0..1",
        (true, false) => "1..*",
        (true, true) => "0..*",
    }
}

/// An entity body still waiting for its `}`.
struct OpenEntity {
    index: usize,
    /// Attribute count when the `--` separator was seen.
    separator_at: Option<usize>,
}

// ============================================
// ER DIAGRAM PARSER
// ============================================

pub fn parse_er(lines: &[String]) -> ErDiagram {
    let mut diagram = ErDiagram::default();
    let mut open: Option<OpenEntity> = None;

    for line in lines {
        let line = line.as_str();

        if let Some(body) = open.as_mut() {
            if line.starts_with('}') {
                if let Some(open) = open.take() {
                    close_entity(&mut diagram, open);
                }
                continue;
            }
            if line.starts_with("--") || line.starts_with("==") || line.starts_with("..") {
                if body.separator_at.is_none() {
                    body.separator_at = Some(diagram.entities[body.index].attributes.len());
                }
                continue;
            }
            if let Some(attribute) = parse_attribute(line) {
                diagram.entities[body.index].attributes.push(attribute);
            }
            continue;
        }

        if let Some(caps) = ENTITY.captures(line) {
            let (name, label) = split_alias(&caps[1]);
            let index = upsert_entity(&mut diagram, name, Some(label));
            if caps.get(2).is_some() && caps.get(3).is_none() {
                open = Some(OpenEntity {
                    index,
                    separator_at: None,
                });
            }
            continue;
        }

        if let Some(caps) = RELATIONSHIP.captures(line) {
            let from = unquote(&caps["from"]).to_string();
            let to = unquote(&caps["to"]).to_string();
            upsert_entity(&mut diagram, from.clone(), None);
            upsert_entity(&mut diagram, to.clone(), None);
            diagram.relationships.push(ErRelationship {
                from,
                to,
                label: caps
                    .name("label")
                    .map(|l| l.as_str().trim().to_string())
                    .filter(|l| !l.is_empty()),
                cardinalities: (
                    cardinality(&caps["left"]).to_string(),
                    cardinality(&caps["right"]).to_string(),
                ),
            });
        }
    }

    if let Some(open) = open {
        close_entity(&mut diagram, open);
    }

    diagram
}

/// Attributes listed above a `--` separator are the key columns.
fn close_entity(diagram: &mut ErDiagram, open: OpenEntity) {
    if let Some(split) = open.separator_at {
        for attribute in diagram.entities[open.index].attributes.iter_mut().take(split) {
            attribute.is_primary_key = true;
        }
    }
}

fn upsert_entity(diagram: &mut ErDiagram, name: String, label: Option<String>) -> usize {
    if let Some(index) = diagram.entities.iter().position(|e| e.id == name) {
        if let Some(label) = label {
            diagram.entities[index].label = label;
        }
        return index;
    }
    diagram.entities.push(ErEntity {
        id: name.clone(),
        label: label.unwrap_or_else(|| name.clone()),
        name,
        attributes: Vec::new(),
    });
    diagram.entities.len() - 1
}

fn parse_attribute(line: &str) -> Option<ErAttribute> {
    let mut is_primary_key = false;
    let mut rest = line.trim();
    if let Some(stripped) = rest.strip_prefix('*') {
        is_primary_key = true;
        rest = stripped.trim_start();
    }
    if TAG.captures_iter(rest).any(|c| c[1].eq_ignore_ascii_case("pk")) {
        is_primary_key = true;
    }
    let cleaned = TAG.replace_all(rest, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    let (name, type_name) = match cleaned.split_once(':') {
        Some((name, ty)) => (name.trim(), Some(ty.trim()).filter(|t| !t.is_empty())),
        None => (cleaned, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(ErAttribute {
        name: name.to_string(),
        type_name: type_name.map(str::to_string),
        is_primary_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        crate::plantuml::normalize::normalize(src)
    }

    #[test]
    fn test_entities_and_primary_keys() {
        let src = r#"
entity "Customer" as C {
  *id : int
  name : text
}
entity Order {
  order_id : number
  --
  customer_id : number <<FK>>
  total : money
}
entity Audit {
  ref : uuid <<PK>>
  note
}
"#;
        let er = parse_er(&lines(src));
        assert_eq!(er.entities.len(), 3);

        let customer = &er.entities[0];
        assert_eq!((customer.id.as_str(), customer.label.as_str()), ("C", "Customer"));
        assert!(customer.attributes[0].is_primary_key);
        assert!(!customer.attributes[1].is_primary_key);
        assert_eq!(customer.attributes[0].type_name.as_deref(), Some("int"));

        let order = &er.entities[1];
        assert_eq!(order.attributes.len(), 3);
        assert!(order.attributes[0].is_primary_key);
        assert!(!order.attributes[1].is_primary_key);
        assert_eq!(order.attributes[1].type_name.as_deref(), Some("number"));

        let audit = &er.entities[2];
        assert!(audit.attributes[0].is_primary_key);
        assert_eq!(audit.attributes[1].name, "note");
        assert_eq!(audit.attributes[1].type_name, None);
    }

    #[test]
    fn test_crows_foot_cardinalities() {
        let src = "C ||--o{ Order : places\nOrder }|..|| Product\nA |o--|{ B";
        let er = parse_er(&lines(src));
        let rel = &er.relationships;
        assert_eq!(rel.len(), 3);
        assert_eq!(rel[0].cardinalities, ("1".to_string(), "0..*".to_string()));
        assert_eq!(rel[0].label.as_deref(), Some("places"));
        assert_eq!(rel[1].cardinalities, ("1..*".to_string(), "1".to_string()));
        assert_eq!(rel[2].cardinalities, ("0..1".to_string(), "1..*".to_string()));

        // Endpoints never declared are created on the fly
        let ids: Vec<_> = er.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "Order", "Product", "A", "B"]);
    }
}
