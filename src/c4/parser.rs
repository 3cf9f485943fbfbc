use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::types::*;
use crate::plantuml::normalize::strip_comments;
use crate::plantuml::parser::unquote;

static DETECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)\b(?:System|Container|Component|Person|Rel)\s*\(|_Boundary\s*\(|^\s*!include\S*\s*\S*C4",
    )
    .unwrap()
});

static MACRO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s*\((.*)\)\s*;?$").unwrap());

static RELATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(BiRel|Rel(?:_Back|_Up|_Down|_Left|_Right|_U|_D|_L|_R)?)\s*\(\s*([\w.]+)\s*,\s*([\w.]+)\s*(?:,\s*"([^"]*)"\s*)?(?:,\s*"([^"]*)"\s*)?"#,
    )
    .unwrap()
});

/// Whether the source uses the architecture macros instead of a PlantUML
/// dialect.
pub fn detect(code: &str) -> bool {
    DETECT.is_match(&strip_comments(code))
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Statement(&'a str),
    Open,
    Close,
}

/// Split a line at braces that sit outside quoted strings.
fn tokenize(line: &str) -> Vec<Token<'_>> {
    fn push_statement<'a>(tokens: &mut Vec<Token<'a>>, text: &'a str) {
        let text = text.trim();
        if !text.is_empty() {
            tokens.push(Token::Statement(text));
        }
    }

    let mut tokens = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '{' | '}' if !in_quotes => {
                push_statement(&mut tokens, &line[start..idx]);
                tokens.push(if c == '{' { Token::Open } else { Token::Close });
                start = idx + 1;
            }
            _ => {}
        }
    }
    push_statement(&mut tokens, &line[start..]);
    tokens
}

/// Split macro arguments on commas outside quotes.
fn split_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (idx, c) in args.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(args[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(args[start..].trim());
    parts
}

fn parse_entity(statement: &str) -> Option<C4Entity> {
    let caps = MACRO.captures(statement)?;
    let kind = C4Kind::from_macro(&caps[1])?;

    let mut positional = Vec::new();
    let mut technology = None;
    let mut description = None;
    for arg in split_args(&caps[2]) {
        if let Some(named) = arg.strip_prefix('$') {
            if let Some((key, value)) = named.split_once('=') {
                let value = unquote(value).to_string();
                match key.trim() {
                    "techn" => technology = Some(value),
                    "descr" => description = Some(value),
                    _ => {}
                }
            }
            continue;
        }
        positional.push(unquote(arg).to_string());
    }

    let mut positional = positional.into_iter();
    let alias = positional.next().filter(|a| !a.is_empty())?;
    let label = positional
        .next()
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| alias.clone());
    if kind.has_technology() {
        technology = technology.or_else(|| positional.next());
    }
    if kind != C4Kind::Boundary {
        description = description.or_else(|| positional.next());
    }

    Some(C4Entity {
        alias,
        label,
        kind,
        technology: technology.filter(|t| !t.is_empty()),
        description: description.filter(|d| !d.is_empty()),
        children: Vec::new(),
    })
}

struct FlatEntity {
    entity: C4Entity,
    parent: Option<usize>,
}

/// Parse element declarations into a tree.
///
/// An element followed by `{` (on the same line or the next) opens a frame;
/// elements declared while the frame is open become its children. Frames
/// still open at the end of input are abandoned.
pub fn parse_entities(code: &str) -> Vec<C4Entity> {
    let mut flat: Vec<FlatEntity> = Vec::new();
    let mut frames: Vec<Option<usize>> = Vec::new();
    let mut last_declared: Option<usize> = None;

    for line in strip_comments(code).lines() {
        if line.starts_with('!') || line.starts_with('@') {
            continue;
        }

        for token in tokenize(line) {
            match token {
                Token::Statement(statement) => {
                    last_declared = None;
                    if let Some(entity) = parse_entity(statement) {
                        let parent = frames.iter().rev().find_map(|frame| *frame);
                        flat.push(FlatEntity { entity, parent });
                        last_declared = Some(flat.len() - 1);
                    }
                }
                Token::Open => frames.push(last_declared.take()),
                Token::Close => {
                    frames.pop();
                }
            }
        }
    }

    debug!(entities = flat.len(); "Parsed architecture entities");
    build_tree(flat)
}

fn build_tree(flat: Vec<FlatEntity>) -> Vec<C4Entity> {
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); flat.len()];
    let mut roots = Vec::new();
    for (idx, item) in flat.iter().enumerate() {
        match item.parent {
            Some(parent) => children[parent].push(idx),
            None => roots.push(idx),
        }
    }

    let mut slots: Vec<Option<C4Entity>> = flat.into_iter().map(|f| Some(f.entity)).collect();

    // Children always come after their parent, so assemble back to front.
    for idx in (0..slots.len()).rev() {
        let kids: Vec<C4Entity> = children[idx]
            .iter()
            .filter_map(|&child| slots[child].take())
            .collect();
        if let Some(entity) = slots[idx].as_mut() {
            entity.children = kids;
        }
    }

    roots.into_iter().filter_map(|idx| slots[idx].take()).collect()
}

/// Collect every `Rel` family call in the source.
pub fn parse_relations(code: &str) -> Vec<C4Relation> {
    RELATION
        .captures_iter(&strip_comments(code))
        .map(|caps| {
            let (mut source, mut target) = (caps[2].to_string(), caps[3].to_string());
            if &caps[1] == "Rel_Back" {
                std::mem::swap(&mut source, &mut target);
            }
            C4Relation {
                source,
                target,
                label: caps.get(4).map(|m| m.as_str().to_string()).unwrap_or_default(),
                description: caps.get(5).map(|m| m.as_str().to_string()).unwrap_or_default(),
                bidirectional: &caps[1] == "BiRel",
            }
        })
        .collect()
}
