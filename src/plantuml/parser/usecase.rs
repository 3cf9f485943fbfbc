use std::sync::LazyLock;

use regex::Regex;

use super::{split_alias, unquote};
use crate::plantuml::types::*;

static ACTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^actor\s+(.+?)(?:\s+<<[^>]*>>)?$").unwrap());

static COLON_ACTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:]+):(?:\s+as\s+([\w.]+))?$").unwrap());

static USECASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^usecase\s+(\([^)]+\)|"[^"]+"|[\w.]+)(?:\s+as\s+("[^"]+"|[\w.]+))?"#).unwrap()
});

static PAREN_USECASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(([^)]+)\)(?:\s+as\s+([\w.]+))?$").unwrap());

static RECTANGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:rectangle|package)\s+("[^"]+"|[^{]+?)(?:\s+as\s+[\w.]+)?\s*\{$"#).unwrap()
});

static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<from>\([^)]+\)|:[^:]+:|"[^"]+"|[\w.]+?)\s*(?P<arrow><?[-.]+(?:left|right|up|down|l|r|u|d)?[-.]*>?)\s*(?P<to>\([^)]+\)|:[^:]+:|"[^"]+"|[\w.]+)\s*(?::\s*(?P<label>.*))?$"#,
    )
    .unwrap()
});

/// Words that mark an undeclared bare endpoint as an actor.
const ACTOR_WORDS: &[&str] = &[
    "user", "admin", "customer", "client", "manager", "guest", "operator", "system",
];

// ============================================
// USECASE DIAGRAM PARSER
// ============================================

pub fn parse_usecase(lines: &[String]) -> UsecaseDiagram {
    let mut diagram = UsecaseDiagram::default();
    let mut rectangle_stack: Vec<usize> = Vec::new();

    for line in lines {
        let line = line.as_str();
        let rectangle = rectangle_stack.last().copied();

        if let Some(caps) = RECTANGLE.captures(line) {
            rectangle_stack.push(diagram.rectangles.len());
            diagram.rectangles.push(Rectangle {
                label: unquote(&caps[1]).to_string(),
                usecases: Vec::new(),
            });
            continue;
        }

        if line == "}" {
            rectangle_stack.pop();
            continue;
        }

        if let Some(caps) = ACTOR.captures(line) {
            let (name, label) = split_alias(&caps[1]);
            add_actor(&mut diagram, name, label);
            continue;
        }

        if let Some(caps) = COLON_ACTOR.captures(line) {
            let label = caps[1].trim().to_string();
            let name = caps.get(2).map_or_else(|| label.clone(), |a| a.as_str().to_string());
            add_actor(&mut diagram, name, label);
            continue;
        }

        if let Some(caps) = USECASE.captures(line) {
            let label = strip_parens(&caps[1]).to_string();
            let name = caps
                .get(2)
                .map_or_else(|| label.clone(), |a| unquote(a.as_str()).to_string());
            add_usecase(&mut diagram, name, label, rectangle);
            continue;
        }

        if let Some(caps) = PAREN_USECASE.captures(line) {
            let label = caps[1].trim().to_string();
            let name = caps.get(2).map_or_else(|| label.clone(), |a| a.as_str().to_string());
            add_usecase(&mut diagram, name, label, rectangle);
            continue;
        }

        if let Some(caps) = LINK.captures(line) {
            let arrow = &caps["arrow"];
            let left = resolve_endpoint(&mut diagram, &caps["from"], rectangle);
            let right = resolve_endpoint(&mut diagram, &caps["to"], rectangle);
            let reversed = arrow.starts_with('<') && !arrow.ends_with('>');
            let (from, to) = if reversed { (right, left) } else { (left, right) };
            diagram.links.push(UsecaseLink {
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

fn strip_parens(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .map(str::trim)
        .unwrap_or_else(|| unquote(token))
}

fn add_actor(diagram: &mut UsecaseDiagram, name: String, label: String) {
    match diagram.actors.iter_mut().find(|a| a.name == name) {
        Some(actor) => actor.label = label,
        None => diagram.actors.push(Actor { name, label }),
    }
}

fn add_usecase(
    diagram: &mut UsecaseDiagram,
    name: String,
    label: String,
    rectangle: Option<usize>,
) {
    if let Some(usecase) = diagram.usecases.iter_mut().find(|u| u.name == name) {
        usecase.label = label;
        return;
    }
    if let Some(rect) = rectangle.and_then(|r| diagram.rectangles.get_mut(r)) {
        rect.usecases.push(name.clone());
    }
    diagram.usecases.push(Usecase {
        name,
        label,
        rectangle,
    });
}

/// Approximation: a leading capital or a role-like word means "actor".
fn looks_like_actor(token: &str) -> bool {
    let lower = token.to_lowercase();
    token.chars().next().is_some_and(char::is_uppercase)
        || ACTOR_WORDS.iter().any(|w| lower.contains(w))
}

/// Resolve a link endpoint to an actor or usecase name, creating it when
/// it was never declared.
fn resolve_endpoint(diagram: &mut UsecaseDiagram, token: &str, rectangle: Option<usize>) -> String {
    let token = token.trim();

    if token.starts_with('(') {
        let label = strip_parens(token).to_string();
        if let Some(u) = diagram.usecases.iter().find(|u| u.label == label || u.name == label) {
            return u.name.clone();
        }
        add_usecase(diagram, label.clone(), label.clone(), rectangle);
        return label;
    }

    if let Some(label) = token.strip_prefix(':').and_then(|t| t.strip_suffix(':')) {
        let label = label.trim().to_string();
        if let Some(a) = diagram.actors.iter().find(|a| a.label == label || a.name == label) {
            return a.name.clone();
        }
        add_actor(diagram, label.clone(), label.clone());
        return label;
    }

    let name = unquote(token).to_string();
    if diagram.actors.iter().any(|a| a.name == name) || diagram.usecases.iter().any(|u| u.name == name)
    {
        return name;
    }
    if looks_like_actor(&name) {
        add_actor(diagram, name.clone(), name.clone());
    } else {
        add_usecase(diagram, name.clone(), name.clone(), rectangle);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        crate::plantuml::normalize::normalize(src)
    }

    #[test]
    fn test_declarations_and_rectangle_membership() {
        let src = r#"
actor "Online Customer" as C
:Administrator: as Admin
usecase (Browse catalog) as UC1
rectangle Shop {
  usecase "Checkout" as UC2
  (Pay)
}
C --> UC1
C --> (Pay) : card
Admin ..> UC2
"#;
        let uc = parse_usecase(&lines(src));
        assert_eq!(uc.actors.len(), 2);
        assert_eq!(uc.actors[0].name, "C");
        assert_eq!(uc.actors[0].label, "Online Customer");
        assert_eq!(uc.actors[1].name, "Admin");
        assert_eq!(uc.actors[1].label, "Administrator");

        assert_eq!(uc.usecases.len(), 3);
        assert_eq!(uc.usecases[0].label, "Browse catalog");
        assert_eq!(uc.usecases[0].rectangle, None);
        assert_eq!(uc.usecases[1].name, "UC2");
        assert_eq!(uc.usecases[1].rectangle, Some(0));
        assert_eq!(uc.rectangles[0].label, "Shop");
        assert_eq!(uc.rectangles[0].usecases, vec!["UC2", "Pay"]);

        assert_eq!(uc.links.len(), 3);
        assert_eq!(uc.links[1].to, "Pay");
        assert_eq!(uc.links[1].label.as_deref(), Some("card"));
        assert!(uc.links[2].is_dashed);
    }

    #[test]
    fn test_undeclared_endpoints_use_actor_heuristic() {
        let src = "actor Bob\nusecase Z\nGuest --> login\nsuperuser --> reset\nBob <-- (Notify)";
        let uc = parse_usecase(&lines(src));
        let actors: Vec<_> = uc.actors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(actors, vec!["Bob", "Guest", "superuser"]);
        let usecases: Vec<_> = uc.usecases.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(usecases, vec!["Z", "login", "reset", "Notify"]);
        assert_eq!(uc.links[2].from, "Notify");
        assert_eq!(uc.links[2].to, "Bob");
    }

    #[test]
    fn test_unclosed_rectangle_keeps_membership() {
        let src = "actor User\nrectangle Shop {\nusecase (Buy) as B\n(Pay)\nUser --> B";
        let uc = parse_usecase(&lines(src));
        assert_eq!(uc.rectangles.len(), 1);
        assert_eq!(uc.usecases.len(), 2);
        assert!(uc.usecases.iter().all(|u| u.rectangle == Some(0)));
        assert_eq!(uc.rectangles[0].usecases, vec!["B", "Pay"]);

        let diagram = crate::plantuml::parser::ParsedDiagram::Usecase(uc);
        let mut ctx = crate::drawio::GeneratorContext::with_prefix("t");
        crate::plantuml::generate::render_cells(&mut ctx, &diagram);
        let summary =
            crate::drawio::inspect(&ctx.finish(&crate::config::ConvertOptions::default())).unwrap();
        assert_eq!(summary.vertices().count(), 4);
        assert_eq!(summary.edges().count(), 1);
        assert!(summary.vertex_by_value("Shop").is_some());
    }

    #[test]
    fn test_dotted_arrow_without_spaces() {
        let uc = parse_usecase(&lines("actor User\nusecase Login\nUser..>Login"));
        assert_eq!(uc.links.len(), 1);
        assert_eq!(uc.links[0].from, "User");
        assert_eq!(uc.links[0].to, "Login");
        assert!(uc.links[0].is_dashed);
    }
}
