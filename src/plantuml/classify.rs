use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::normalize::normalize;

/// The PlantUML sub-languages understood by the parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Sequence,
    Usecase,
    Activity,
    State,
    Mindmap,
    Er,
    Deployment,
    Class,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sequence => "sequence",
            Dialect::Usecase => "usecase",
            Dialect::Activity => "activity",
            Dialect::State => "state",
            Dialect::Mindmap => "mindmap",
            Dialect::Er => "er",
            Dialect::Deployment => "deployment",
            Dialect::Class => "class",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `A -> B :` style message line.
static MESSAGE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"?[\w. ]*?[\w]"?\s*->>?\s*"?[\w. ]+"?\s*:"#).unwrap());

static ACTION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:.*;$").unwrap());

static MINDMAP_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*+\-]+_?\s+\S").unwrap());

/// Decide which dialect a source text is written in.
///
/// Rules are tried in a fixed order and the first match wins; sequence
/// detection must come before usecase because `actor A` plus an
/// `A -> B : msg` line looks like an actor block too.
pub fn classify(source: &str) -> Dialect {
    let lines = normalize(source);
    let has_line = |pred: &dyn Fn(&str) -> bool| lines.iter().any(|l| pred(l));
    let starts = |prefix: &str| lines.iter().any(|l| l.starts_with(prefix));

    let has_message = has_line(&|l| MESSAGE_LINE.is_match(l));
    let has_arrow = source.contains(" -> ");

    if has_message
        || (starts("participant ") && has_arrow)
        || (starts("actor ") && has_arrow && has_message)
    {
        return Dialect::Sequence;
    }

    if starts("actor ") && (starts("usecase ") || starts("rectangle ")) && !has_message {
        return Dialect::Usecase;
    }

    let has_start = has_line(&|l| l == "start");
    let has_stop = has_line(&|l| l == "stop");
    let has_action = has_line(&|l| ACTION_LINE.is_match(l));
    let has_if = starts("if (") || starts("if(");
    let has_endif = has_line(&|l| l == "endif" || l == "end if");
    if (has_start && has_stop) || has_action || (has_if && has_endif) {
        return Dialect::Activity;
    }

    if source.contains("[*]") || (starts("state ") && has_line(&|l| l.contains("-->"))) {
        return Dialect::State;
    }

    if source.contains("@startmindmap")
        || (!lines.is_empty() && lines.iter().all(|l| MINDMAP_LINE.is_match(l)))
    {
        return Dialect::Mindmap;
    }

    if starts("entity ") || source.contains("}|") || source.contains("|{") {
        return Dialect::Er;
    }

    if starts("database ") || starts("cloud ") || starts("artifact ") {
        return Dialect::Deployment;
    }

    Dialect::Class
}

#[cfg(test)]
mod tests {
    use super::{Dialect, classify};
    use proptest::prelude::*;

    #[test]
    fn class_is_the_default() {
        let src = "@startuml\nclass A\nclass B\nA --> B\n@enduml";
        assert_eq!(classify(src), Dialect::Class);
        assert_eq!(classify(""), Dialect::Class);
    }

    #[test]
    fn message_line_wins_over_usecase_keywords() {
        let src = "actor X\nusecase Y\nA -> B : msg";
        assert_eq!(classify(src), Dialect::Sequence);
    }

    #[test]
    fn participant_with_arrow_is_sequence() {
        assert_eq!(classify("participant A\nA -> B"), Dialect::Sequence);
    }

    #[test]
    fn actor_with_usecase_is_usecase() {
        let src = "actor User\nusecase (Login) as UC1\nUser --> UC1";
        assert_eq!(classify(src), Dialect::Usecase);
        let src = "actor User\nrectangle Shop {\n(Browse)\n}\nUser --> (Browse)";
        assert_eq!(classify(src), Dialect::Usecase);
    }

    #[test]
    fn activity_forms() {
        assert_eq!(classify("start\n:Do X;\nstop"), Dialect::Activity);
        assert_eq!(classify("start\nstop"), Dialect::Activity);
        assert_eq!(classify("if (ok?) then (yes)\nendif"), Dialect::Activity);
    }

    #[test]
    fn state_forms() {
        assert_eq!(classify("[*] --> Idle\nIdle --> [*]"), Dialect::State);
        assert_eq!(classify("state Idle\nIdle --> Busy"), Dialect::State);
        assert_eq!(
            classify("[*] --> Idle\nIdle --> Busy : go"),
            Dialect::State,
            "dashed transitions with labels are not messages"
        );
    }

    #[test]
    fn mindmap_forms() {
        assert_eq!(classify("@startmindmap\n* Root\n@endmindmap"), Dialect::Mindmap);
        assert_eq!(classify("* Root\n** Child1\n** Child2"), Dialect::Mindmap);
    }

    #[test]
    fn er_and_deployment() {
        assert_eq!(classify("entity User {\n* id : int\n}"), Dialect::Er);
        assert_eq!(classify("A ||--|{ B"), Dialect::Er);
        assert_eq!(classify("database Db\nnode App\nApp --> Db"), Dialect::Deployment);
    }

    proptest! {
        #[test]
        fn classification_is_deterministic(s in "[a-zA-Z:;\\[\\]*(){}|> \\n-]{0,80}") {
            prop_assert_eq!(classify(&s), classify(&s));
        }
    }
}
