use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::plantuml::types::*;

static NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([*+\-]+)(?:\[#\w+\])?(_)?\s+(.*)$").unwrap());

// ============================================
// MINDMAP PARSER
// ============================================

/// Parse `*`/`+`/`-` prefixed lines into a node list.
///
/// The run length is the depth. A run containing `+` goes on the right,
/// anything else on the left. Each node hangs off the most recent node one
/// level up.
pub fn parse_mindmap(lines: &[String]) -> MindmapDiagram {
    let mut diagram = MindmapDiagram::default();
    let mut last_at_level: HashMap<usize, usize> = HashMap::new();

    for line in lines {
        let Some(caps) = NODE.captures(line) else {
            continue;
        };
        let run = &caps[1];
        let text = caps[3].trim();
        if text.is_empty() {
            continue;
        }

        let level = run.chars().count();
        let id = diagram.nodes.len();
        let parent = level
            .checked_sub(1)
            .and_then(|up| last_at_level.get(&up).copied());

        diagram.nodes.push(MindmapNode {
            id,
            text: text.to_string(),
            level,
            side: if run.contains('+') { Side::Right } else { Side::Left },
            parent,
        });
        last_at_level.insert(level, id);
    }

    diagram
}
