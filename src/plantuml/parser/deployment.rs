use std::sync::LazyLock;

use regex::Regex;

use super::{split_alias, unquote};
use crate::plantuml::types::*;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(node|database|cloud|artifact|component|folder|frame|storage|queue|file|package|rectangle|card|agent|stack|actor)\s+(.+?)\s*(?:<<[^>]*>>)?\s*(?:#\w+)?\s*(\{)?\s*\}?$",
    )
    .unwrap()
});

static CONNECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<from>"[^"]+"|[\w.]+?)\s*(?P<arrow><?[-.]+(?:left|right|up|down|l|r|u|d)?[-.]*>?)\s*(?P<to>"[^"]+"|[\w.]+)\s*(?::\s*(?P<label>.*))?$"#,
    )
    .unwrap()
});

// ============================================
// DEPLOYMENT DIAGRAM PARSER
// ============================================

pub fn parse_deployment(lines: &[String]) -> DeploymentDiagram {
    let mut diagram = DeploymentDiagram::default();

    for line in lines {
        let line = line.as_str();

        if line == "}" {
            continue;
        }

        if let Some(caps) = DECLARATION.captures(line) {
            let Some(kind) = DeploymentKind::from_keyword(&caps[1]) else {
                continue;
            };
            let (name, label) = split_alias(&caps[2]);
            match diagram.nodes.iter_mut().find(|n| n.id == name) {
                Some(node) => {
                    node.label = label;
                    node.kind = kind;
                }
                None => diagram.nodes.push(DeploymentNode {
                    id: name.clone(),
                    name,
                    label,
                    kind,
                }),
            }
            continue;
        }

        if let Some(caps) = CONNECTION.captures(line) {
            let arrow = &caps["arrow"];
            let left = ensure_node(&mut diagram, &caps["from"]);
            let right = ensure_node(&mut diagram, &caps["to"]);
            let reversed = arrow.starts_with('<') && !arrow.ends_with('>');
            let (from, to) = if reversed { (right, left) } else { (left, right) };
            diagram.connections.push(Connection {
                from,
                to,
                label: caps
                    .name("label")
                    .map(|l| l.as_str().trim().to_string())
                    .filter(|l| !l.is_empty()),
                is_dashed: arrow.contains('.'),
            });
        }
    }

    diagram
}

/// Return the id for a connection endpoint, creating a plain node if needed.
fn ensure_node(diagram: &mut DeploymentDiagram, token: &str) -> String {
    let name = unquote(token).to_string();
    if !diagram.nodes.iter().any(|n| n.id == name) {
        diagram.nodes.push(DeploymentNode {
            id: name.clone(),
            name: name.clone(),
            label: name.clone(),
            kind: DeploymentKind::Node,
        });
    }
    name
}
