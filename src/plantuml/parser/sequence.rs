use std::sync::LazyLock;

use regex::Regex;

use super::{split_alias, unquote};
use crate::plantuml::types::*;

static PARTICIPANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(participant|actor|boundary|control|entity|database|collections|queue)\s+(.+?)(?:\s+order\s+\d+)?(?:\s+#\w+)?$",
    )
    .unwrap()
});

static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^==+\s*(.*?)\s*==+$").unwrap());

static FRAGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(alt|opt|loop|par|break|critical|group)\b\s*(.*)$").unwrap()
});

static MESSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<from>"[^"]+"|[\w.]+)\s*(?P<arrow><<?-{1,2}>{0,2}|-{1,2}>{1,2})\s*(?P<to>"[^"]+"|[\w.]+)\s*(?::\s*(?P<text>.*))?$"#,
    )
    .unwrap()
});

// ============================================
// SEQUENCE DIAGRAM PARSER
// ============================================

pub fn parse_sequence(lines: &[String]) -> SequenceDiagram {
    let mut diagram = SequenceDiagram::default();
    // Open fragments, as indices into `diagram.groups`
    let mut fragments: Vec<usize> = Vec::new();

    for line in lines {
        let line = line.as_str();

        if let Some(caps) = PARTICIPANT.captures(line) {
            let kind = if &caps[1] == "actor" {
                ParticipantKind::Actor
            } else {
                ParticipantKind::Participant
            };
            let (name, label) = split_alias(&caps[2]);
            declare_participant(&mut diagram.participants, name, label, kind);
            continue;
        }

        if let Some(caps) = SEPARATOR.captures(line) {
            diagram.groups.push(Group {
                label: caps[1].to_string(),
                kind: GroupKind::Separator,
                start_index: diagram.messages.len(),
                end_index: None,
            });
            continue;
        }

        if let Some(caps) = FRAGMENT.captures(line) {
            fragments.push(diagram.groups.len());
            diagram.groups.push(Group {
                label: format!("{} {}", &caps[1], caps[2].trim()).trim().to_string(),
                kind: GroupKind::Fragment,
                start_index: diagram.messages.len(),
                end_index: None,
            });
            continue;
        }

        if line == "else" || line.starts_with("else ") {
            diagram.groups.push(Group {
                label: line.to_string(),
                kind: GroupKind::Branch,
                start_index: diagram.messages.len(),
                end_index: None,
            });
            continue;
        }

        if line == "end" || (line.starts_with("end ") && FRAGMENT.is_match(&line[4..])) {
            if let Some(idx) = fragments.pop() {
                diagram.groups[idx].end_index = Some(diagram.messages.len());
            }
            continue;
        }

        if line == "return" || line.starts_with("return ") {
            let reply = diagram.messages.iter().rev().find(|m| !m.is_return).map(|m| Message {
                from: m.to.clone(),
                to: m.from.clone(),
                text: line.trim_start_matches("return").trim().to_string(),
                is_return: true,
                is_async: false,
                is_dashed: true,
            });
            if let Some(reply) = reply {
                diagram.messages.push(reply);
            }
            continue;
        }

        if let Some(message) = parse_sequence_message(line) {
            for name in [&message.from, &message.to] {
                if !diagram.participants.iter().any(|p| &p.name == name) {
                    diagram.participants.push(Participant {
                        name: name.clone(),
                        label: name.clone(),
                        kind: ParticipantKind::Participant,
                    });
                }
            }
            diagram.messages.push(message);
        }
    }

    diagram
}

/// Register a participant, upgrading an implicit registration in place.
fn declare_participant(
    participants: &mut Vec<Participant>,
    name: String,
    label: String,
    kind: ParticipantKind,
) {
    match participants.iter_mut().find(|p| p.name == name) {
        Some(existing) => {
            existing.label = label;
            existing.kind = kind;
        }
        None => participants.push(Participant { name, label, kind }),
    }
}

fn parse_sequence_message(line: &str) -> Option<Message> {
    let caps = MESSAGE.captures(line)?;
    let arrow = &caps["arrow"];
    let left = unquote(&caps["from"]).to_string();
    let right = unquote(&caps["to"]).to_string();

    // `A <- B` points from B to A
    let reversed = arrow.starts_with('<') && !arrow.ends_with('>');
    let (from, to) = if reversed { (right, left) } else { (left, right) };
    let is_dashed = arrow.contains("--");

    Some(Message {
        from,
        to,
        text: caps
            .name("text")
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
        is_return: is_dashed,
        is_async: arrow.contains(">>") || arrow.contains("<<"),
        is_dashed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        crate::plantuml::normalize::normalize(src)
    }

    #[test]
    fn test_participants_and_messages() {
        let src = r#"
participant Alice
actor Bob
Alice -> Bob : Hello!
Bob --> Alice : Hi!
Alice ->> Carol : async
"#;
        let seq = parse_sequence(&lines(src));
        let names: Vec<_> = seq.participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        assert_eq!(seq.participants[1].kind, ParticipantKind::Actor);
        assert_eq!(seq.participants[2].kind, ParticipantKind::Participant);

        assert_eq!(seq.messages.len(), 3);
        assert_eq!(seq.messages[0].text, "Hello!");
        assert!(!seq.messages[0].is_dashed);
        assert!(seq.messages[1].is_return && seq.messages[1].is_dashed);
        assert!(seq.messages[2].is_async);
    }

    #[test]
    fn test_aliases_and_reverse_arrows() {
        let src = "participant \"Web Server\" as S\nactor U as \"User\"\nU -> S : Request\nU <- S : Response";
        let seq = parse_sequence(&lines(src));
        assert_eq!(seq.participants[0].name, "S");
        assert_eq!(seq.participants[0].label, "Web Server");
        assert_eq!(seq.participants[1].name, "U");
        assert_eq!(seq.participants[1].label, "User");
        assert_eq!(seq.participants.len(), 2);
        assert_eq!(seq.messages[1].from, "S");
        assert_eq!(seq.messages[1].to, "U");
    }

    #[test]
    fn test_late_declaration_upgrades_implicit_participant() {
        let seq = parse_sequence(&lines("A -> B : hi\nactor B as \"Bee\""));
        assert_eq!(seq.participants.len(), 2);
        assert_eq!(seq.participants[1].kind, ParticipantKind::Actor);
        assert_eq!(seq.participants[1].label, "Bee");
    }

    #[test]
    fn test_groups_record_start_indices() {
        let src = r#"
A -> B : one
== Phase 2 ==
alt success
B -> A : ok
else failure
B -> A : err
end
A -> B : two
"#;
        let seq = parse_sequence(&lines(src));
        assert_eq!(seq.groups.len(), 3);

        assert_eq!(seq.groups[0].kind, GroupKind::Separator);
        assert_eq!(seq.groups[0].label, "Phase 2");
        assert_eq!(seq.groups[0].start_index, 1);

        assert_eq!(seq.groups[1].kind, GroupKind::Fragment);
        assert_eq!(seq.groups[1].label, "alt success");
        assert_eq!(seq.groups[1].start_index, 1);
        assert_eq!(seq.groups[1].end_index, Some(3));

        assert_eq!(seq.groups[2].kind, GroupKind::Branch);
        assert_eq!(seq.groups[2].start_index, 2);
    }

    #[test]
    fn test_return_replies_to_last_caller() {
        let seq = parse_sequence(&lines("A -> B : ask\nreturn answer"));
        let reply = &seq.messages[1];
        assert_eq!((reply.from.as_str(), reply.to.as_str()), ("B", "A"));
        assert_eq!(reply.text, "answer");
        assert!(reply.is_return);
    }

    #[test]
    fn test_unbalanced_end_is_ignored() {
        let seq = parse_sequence(&lines("end\nalt x\nA -> B"));
        assert_eq!(seq.groups.len(), 1);
        assert_eq!(seq.groups[0].end_index, None);
        assert_eq!(seq.messages.len(), 1);
    }
}
