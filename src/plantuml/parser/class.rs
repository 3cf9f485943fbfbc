use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::unquote;
use crate::plantuml::types::*;

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(abstract\s+class|abstract|class|interface|enum)\s+("[^"]+"|[\w.$]+)(?:\s+as\s+([\w.$]+))?(?:\s*<[^>{]*>)?(?:\s*<<[^>]*>>)?(?:\s+(extends|implements)\s+([\w.$]+))?\s*(\{)?\s*(\})?$"#,
    )
    .unwrap()
});

static RELATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<from>"[^"]+"|[\w.$]+)\s*(?:"[^"]*"\s*)?(?P<head><\|?|\*|o|\+)?(?P<line>-+|\.+)(?:(?:left|right|up|down|le|ri|do|l|r|u|d)(?:-+|\.+))?(?P<tail>\|?>|\*|o\s|\+)?\s*(?:"[^"]*"\s*)?(?P<to>"[^"]+"|[\w.$]+)\s*(?::\s*(?P<label>.*))?$"#,
    )
    .unwrap()
});

static MEMBER_ADDITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\w.$]+)\s*:\s*(.+)$").unwrap());

// ============================================
// CLASS DIAGRAM PARSER
// ============================================

pub fn parse_class(lines: &[String]) -> ClassDiagram {
    let mut classes: Vec<ClassDef> = Vec::new();
    let mut relations: Vec<Relation> = Vec::new();
    let mut current_class: Option<ClassDef> = None;

    for line in lines {
        let line = line.as_str();

        // Inside a class body
        if current_class.is_some() {
            if line.starts_with('}') {
                if let Some(cls) = current_class.take() {
                    classes.push(cls);
                }
            } else if !is_separator(line) {
                if let Some(cls) = current_class.as_mut() {
                    add_member(cls, line);
                }
            }
            continue;
        }

        if let Some(caps) = DECLARATION.captures(line) {
            let cls = declaration(&caps);

            if let (Some(keyword), Some(parent)) = (caps.get(4), caps.get(5)) {
                relations.push(Relation {
                    from: cls.name.clone(),
                    to: parent.as_str().to_string(),
                    kind: if keyword.as_str() == "extends" {
                        RelationKind::Extends
                    } else {
                        RelationKind::Implements
                    },
                    label: None,
                });
            }

            // `class A {` opens a body, `class A {}` does not
            if caps.get(6).is_some() && caps.get(7).is_none() {
                current_class = Some(cls);
            } else {
                classes.push(cls);
            }
            continue;
        }

        if let Some(relation) = parse_class_relation(line) {
            relations.push(relation);
            continue;
        }

        if let Some(caps) = MEMBER_ADDITION.captures(line) {
            if let Some(cls) = classes.iter_mut().find(|c| c.name == caps[1]) {
                add_member(cls, &caps[2]);
            }
        }
    }

    // Unterminated body at end of input
    if let Some(cls) = current_class {
        classes.push(cls);
    }

    ClassDiagram { classes, relations }
}

fn declaration(caps: &Captures<'_>) -> ClassDef {
    let keyword = caps.get(1).map_or("class", |m| m.as_str());
    let kind = if keyword.starts_with("abstract") {
        ClassKind::Abstract
    } else {
        match keyword {
            "interface" => ClassKind::Interface,
            "enum" => ClassKind::Enum,
            _ => ClassKind::Class,
        }
    };

    let name = caps
        .get(3)
        .map(|alias| alias.as_str().to_string())
        .unwrap_or_else(|| unquote(&caps[2]).to_string());

    ClassDef {
        name,
        kind,
        attributes: Vec::new(),
        methods: Vec::new(),
    }
}

/// Body separators: `--`, `..`, `==`, `__`, optionally with a title.
fn is_separator(line: &str) -> bool {
    ["--", "..", "==", "__"].iter().any(|sep| line.starts_with(sep))
}

fn add_member(cls: &mut ClassDef, line: &str) {
    let member = parse_member(line);
    if member.name.is_empty() {
        return;
    }
    if member.is_method {
        cls.methods.push(member);
    } else {
        cls.attributes.push(member);
    }
}

/// Parse one member line: `+name : Type`, `-Type name`, `#op(a) : Ret`.
fn parse_member(line: &str) -> ClassMember {
    let mut rest = strip_modifiers(line.trim());
    let visibility = rest.chars().next().and_then(Visibility::from_marker);
    if visibility.is_some() {
        rest = strip_modifiers(&rest[1..]);
    }

    if let (Some(open), Some(close)) = (rest.find('('), rest.rfind(')')) {
        if open < close {
            let head = rest[..open].trim();
            let params = rest[open + 1..close].trim();
            let after = rest[close + 1..].trim();

            let (type_prefix, name) = split_type_prefix(head);
            let type_name = after
                .strip_prefix(':')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .or(type_prefix);

            return ClassMember {
                visibility,
                name: format!("{}({})", name, params),
                type_name,
                is_method: true,
            };
        }
    }

    if let Some((name, type_name)) = rest.split_once(':') {
        return ClassMember {
            visibility,
            name: name.trim().to_string(),
            type_name: Some(type_name.trim().to_string()).filter(|t| !t.is_empty()),
            is_method: false,
        };
    }

    let (type_name, name) = split_type_prefix(rest);
    ClassMember {
        visibility,
        name,
        type_name,
        is_method: false,
    }
}

fn strip_modifiers(mut text: &str) -> &str {
    for modifier in ["{static}", "{abstract}", "{field}", "{method}"] {
        text = text.trim_start().trim_start_matches(modifier);
    }
    text.trim_start()
}

/// `String name` -> (Some("String"), "name"); `name` -> (None, "name").
fn split_type_prefix(text: &str) -> (Option<String>, String) {
    match text.trim().rsplit_once(char::is_whitespace) {
        Some((ty, name)) => (Some(ty.trim().to_string()), name.trim().to_string()),
        None => (None, text.trim().to_string()),
    }
}

fn parse_class_relation(line: &str) -> Option<Relation> {
    let caps = RELATION.captures(line)?;
    let left = unquote(&caps["from"]).to_string();
    let right = unquote(&caps["to"]).to_string();
    let dotted = caps["line"].starts_with('.');
    let head = caps.name("head").map(|m| m.as_str());
    let tail = caps.name("tail").map(|m| m.as_str().trim());
    let label = caps
        .name("label")
        .map(|m| m.as_str().trim().to_string())
        .filter(|l| !l.is_empty());

    let inherit = if dotted {
        RelationKind::Implements
    } else {
        RelationKind::Extends
    };
    let plain = if dotted {
        RelationKind::Dependency
    } else {
        RelationKind::Association
    };

    // `from` is the child for inheritance and the whole for composition.
    let (from, to, kind) = match (head, tail) {
        (Some("<|"), _) => (right, left, inherit),
        (_, Some("|>")) => (left, right, inherit),
        (Some("*"), _) => (left, right, RelationKind::Composition),
        (_, Some("*")) => (right, left, RelationKind::Composition),
        (Some("o"), _) => (left, right, RelationKind::Aggregation),
        (_, Some("o")) => (right, left, RelationKind::Aggregation),
        (Some("<"), None) => (right, left, plain),
        _ => (left, right, plain),
    };

    Some(Relation {
        from,
        to,
        kind,
        label,
    })
}
