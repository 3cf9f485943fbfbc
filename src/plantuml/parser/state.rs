use std::sync::LazyLock;

use regex::Regex;

use super::{split_alias, unquote};
use crate::plantuml::types::*;

static STATE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^state\s+("[^"]+"(?:\s+as\s+[\w.]+)?|[\w.]+(?:\s+as\s+"[^"]+")?)\s*(?:<<\w+>>)?\s*(?:#\w+)?\s*(?::\s*(.*?))?\s*\{?$"#)
        .unwrap()
});

static TRANSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(\[\*\]|"[^"]+"|[\w.]+)\s*-+(?:left|right|up|down|le|ri|do|l|r|u|d)?-*>\s*(\[\*\]|"[^"]+"|[\w.]+)\s*(?::\s*(.*))?$"#,
    )
    .unwrap()
});

static DESCRIPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.]+)\s*:\s*(.+)$").unwrap());

// ============================================
// STATE DIAGRAM PARSER
// ============================================

pub fn parse_state(lines: &[String]) -> StateDiagram {
    let mut diagram = StateDiagram::default();

    for line in lines {
        let line = line.as_str();

        if let Some(caps) = TRANSITION.captures(line) {
            let from = resolve_endpoint(&mut diagram.states, &caps[1], true);
            let to = resolve_endpoint(&mut diagram.states, &caps[2], false);
            diagram.transitions.push(Transition {
                from,
                to,
                label: caps
                    .get(3)
                    .map(|l| l.as_str().trim().to_string())
                    .filter(|l| !l.is_empty()),
            });
            continue;
        }

        if let Some(caps) = STATE_DECL.captures(line) {
            let (name, label) = split_alias(&caps[1]);
            let description = caps.get(2).map(|d| d.as_str().trim()).filter(|d| !d.is_empty());
            let label = match description {
                Some(desc) => format!("{}\n{}", label, desc),
                None => label,
            };
            match diagram.states.iter_mut().find(|s| s.id == name) {
                Some(state) => state.label = label,
                None => diagram.states.push(State {
                    id: name.clone(),
                    name,
                    label,
                    kind: StateKind::State,
                }),
            }
            continue;
        }

        // Composite state braces are accepted but not modelled
        if line == "}" || line == "--" || line == "||" {
            continue;
        }

        if let Some(caps) = DESCRIPTION.captures(line) {
            if let Some(state) = diagram.states.iter_mut().find(|s| s.id == caps[1]) {
                state.label = format!("{}\n{}", state.label, caps[2].trim());
            }
        }
    }

    diagram
}

/// Look up or create the state behind a transition endpoint.
///
/// `[*]` becomes one synthetic start state when used as a source and one
/// synthetic end state when used as a target.
fn resolve_endpoint(states: &mut Vec<State>, token: &str, is_source: bool) -> String {
    let (id, kind) = if token == "[*]" {
        if is_source {
            (START_STATE_ID.to_string(), StateKind::Start)
        } else {
            (END_STATE_ID.to_string(), StateKind::End)
        }
    } else {
        (unquote(token).to_string(), StateKind::State)
    };

    if !states.iter().any(|s| s.id == id) {
        let name = if kind == StateKind::State {
            id.clone()
        } else {
            "[*]".to_string()
        };
        states.push(State {
            id: id.clone(),
            label: if kind == StateKind::State {
                name.clone()
            } else {
                String::new()
            },
            name,
            kind,
        });
    }
    id
}
