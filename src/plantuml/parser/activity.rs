use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::unquote;
use crate::plantuml::types::*;

static SWIMLANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|(?:(#\w+)\|)?([^|]+)\|$").unwrap());

static PARTITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^partition\s+(?:(#\w+)\s+)?("[^"]+"|[^{]+?)\s*(\{)?$"#).unwrap()
});

static IF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^if\s*\((.*)\)\s*(?:is\s*\([^)]*\)\s*)?then\s*(?:\((.*)\))?$").unwrap()
});

static ELSEIF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^else\s*if\s*\((.*)\)\s*(?:is\s*\([^)]*\)\s*)?then\s*(?:\((.*)\))?$").unwrap()
});

static ELSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^else\s*(?:\((.*)\))?$").unwrap());

static ACTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:(.*)[;|<>\]}/]$").unwrap());

/// An open `if` construct awaiting its `endif`.
struct IfFrame {
    decision: usize,
    branches: Vec<String>,
}

/// Mutable parse state threaded through the line handlers.
#[derive(Default)]
struct ActivityBuilder {
    activities: Vec<Activity>,
    swimlanes: Vec<Swimlane>,
    partitions: Vec<Partition>,
    current_lane: Option<usize>,
    partition_stack: Vec<usize>,
    if_stack: Vec<IfFrame>,
}

impl ActivityBuilder {
    fn push(
        &mut self,
        kind: ActivityKind,
        label: impl Into<String>,
        branch_label: Option<String>,
        related_decision: Option<usize>,
    ) -> usize {
        let id = self.activities.len();
        self.activities.push(Activity {
            id,
            kind,
            label: label.into(),
            branch_label,
            swimlane: self.current_lane,
            partition: self.partition_stack.last().copied(),
            related_decision,
        });
        id
    }

    fn enter_lane(&mut self, label: &str, color: Option<String>) {
        let index = self.activities.len();
        if let Some(lane) = self.current_lane.and_then(|l| self.swimlanes.get_mut(l)) {
            lane.end_index = Some(index);
        }

        let existing = self.swimlanes.iter().position(|l| l.label == label);
        let lane = match existing {
            Some(id) => {
                if color.is_some() {
                    self.swimlanes[id].color = color;
                }
                id
            }
            None => {
                let id = self.swimlanes.len();
                self.swimlanes.push(Swimlane {
                    id,
                    label: label.to_string(),
                    color,
                    start_index: index,
                    end_index: None,
                });
                id
            }
        };
        self.current_lane = Some(lane);
    }

    fn open_partition(&mut self, label: &str, color: Option<String>) {
        let id = self.partitions.len();
        self.partitions.push(Partition {
            id,
            label: label.to_string(),
            color,
            start_index: self.activities.len(),
            end_index: None,
        });
        self.partition_stack.push(id);
    }

    fn close_partition(&mut self) {
        if let Some(id) = self.partition_stack.pop() {
            self.partitions[id].end_index = Some(self.activities.len());
        }
    }

    fn finish(mut self) -> ActivityDiagram {
        // Lanes and partitions still open at end of input are closed here;
        // open `if` frames are dropped without a merge node.
        let end = self.activities.len();
        if let Some(lane) = self.current_lane.and_then(|l| self.swimlanes.get_mut(l)) {
            lane.end_index = Some(end);
        }
        while !self.partition_stack.is_empty() {
            self.close_partition();
        }

        let edges = build_activity_edges(&self.activities);
        ActivityDiagram {
            activities: self.activities,
            edges,
            swimlanes: self.swimlanes,
            partitions: self.partitions,
        }
    }
}

// ============================================
// ACTIVITY DIAGRAM PARSER
// ============================================

pub fn parse_activity(lines: &[String]) -> ActivityDiagram {
    let mut builder = ActivityBuilder::default();
    // Multi-line `:text` ... `text;` action being collected
    let mut pending_action: Option<String> = None;

    for line in lines {
        let line = line.as_str();

        if let Some(mut text) = pending_action.take() {
            text.push('\n');
            match line.strip_suffix(';') {
                Some(last) => {
                    text.push_str(last);
                    builder.push(ActivityKind::Action, text, None, None);
                }
                None => {
                    text.push_str(line);
                    pending_action = Some(text);
                }
            }
            continue;
        }

        match line {
            "start" => {
                builder.push(ActivityKind::Start, "", None, None);
                continue;
            }
            "stop" | "end" | "kill" | "detach" => {
                builder.push(ActivityKind::End, "", None, None);
                continue;
            }
            "fork" | "end fork" | "end merge" => {
                builder.push(ActivityKind::Fork, "", None, None);
                continue;
            }
            "fork again" => continue,
            "endif" | "end if" => {
                if let Some(frame) = builder.if_stack.pop() {
                    builder.push(ActivityKind::Merge, "", None, Some(frame.decision));
                }
                continue;
            }
            "}" | "end partition" => {
                builder.close_partition();
                continue;
            }
            _ => {}
        }

        if let Some(caps) = SWIMLANE.captures(line) {
            let color = caps.get(1).map(|c| c.as_str().to_string());
            builder.enter_lane(caps[2].trim(), color);
            continue;
        }

        if let Some(caps) = PARTITION.captures(line) {
            let color = caps.get(1).map(|c| c.as_str().to_string());
            builder.open_partition(unquote(&caps[2]), color);
            continue;
        }

        if let Some(caps) = IF.captures(line) {
            let branch = caps.get(2).map(|b| b.as_str().trim().to_string());
            let decision = builder.push(
                ActivityKind::Decision,
                caps[1].trim(),
                branch.clone(),
                None,
            );
            builder.if_stack.push(IfFrame {
                decision,
                branches: branch.into_iter().collect(),
            });
            continue;
        }

        if let Some(caps) = ELSEIF.captures(line) {
            if let Some(decision) = builder.if_stack.last().map(|f| f.decision) {
                let branch = caps.get(2).map(|b| b.as_str().trim().to_string());
                builder.push(
                    ActivityKind::ElseIfMarker,
                    caps[1].trim(),
                    branch.clone(),
                    Some(decision),
                );
                if let Some(frame) = builder.if_stack.last_mut() {
                    frame.branches.push(branch.unwrap_or_else(|| caps[1].trim().to_string()));
                }
            }
            continue;
        }

        if let Some(caps) = ELSE.captures(line) {
            if let Some(decision) = builder.if_stack.last().map(|f| f.decision) {
                let branch = caps.get(1).map(|b| b.as_str().trim().to_string());
                builder.push(ActivityKind::ElseMarker, "", branch.clone(), Some(decision));
                if let Some(frame) = builder.if_stack.last_mut() {
                    frame.branches.push(branch.unwrap_or_default());
                }
            }
            continue;
        }

        if let Some(caps) = ACTION.captures(line) {
            builder.push(ActivityKind::Action, caps[1].trim(), None, None);
            continue;
        }

        if let Some(first) = line.strip_prefix(':') {
            pending_action = Some(first.to_string());
        }
    }

    builder.finish()
}

/// Connect activities in list order.
///
/// A decision fans out to its first branch and to the successor of each of
/// its `else`/`elseif` markers. Markers themselves get no edges; the node
/// right before a marker is routed to the decision's merge node instead.
pub fn build_activity_edges(activities: &[Activity]) -> Vec<ActivityEdge> {
    let merge_of: HashMap<usize, usize> = activities
        .iter()
        .filter(|a| a.kind == ActivityKind::Merge)
        .filter_map(|a| a.related_decision.map(|decision| (decision, a.id)))
        .collect();

    let mut edges = Vec::new();
    let mut connect = |from: usize, to: Option<usize>, label: Option<String>| {
        if let Some(to) = to {
            edges.push(ActivityEdge { from, to, label });
        }
    };

    for (i, current) in activities.iter().enumerate() {
        if current.kind.is_marker() || current.kind == ActivityKind::End {
            continue;
        }
        let Some(next) = activities.get(i + 1) else {
            continue;
        };

        if current.kind == ActivityKind::Decision {
            let merge = merge_of.get(&current.id).copied();
            let first = if next.kind.is_marker() {
                merge
            } else {
                Some(next.id)
            };
            connect(current.id, first, current.branch_label.clone());

            for (j, marker) in activities.iter().enumerate().skip(i + 1) {
                if !marker.kind.is_marker() || marker.related_decision != Some(current.id) {
                    continue;
                }
                let target = match activities.get(j + 1) {
                    Some(successor) if !successor.kind.is_marker() => Some(successor.id),
                    _ => merge,
                };
                let label = match marker.kind {
                    ActivityKind::ElseIfMarker if !marker.label.is_empty() => {
                        Some(marker.label.clone())
                    }
                    _ => marker.branch_label.clone(),
                };
                connect(current.id, target, label);
            }
            continue;
        }

        if next.kind.is_marker() {
            let merge = next.related_decision.and_then(|d| merge_of.get(&d).copied());
            connect(current.id, merge, None);
            continue;
        }

        connect(current.id, Some(next.id), None);
    }

    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &str) -> Vec<String> {
        crate::plantuml::normalize::normalize(src)
    }

    fn edge_pairs(diagram: &ActivityDiagram) -> Vec<(usize, usize)> {
        diagram.edges.iter().map(|e| (e.from, e.to)).collect()
    }

    #[test]
    fn test_start_action_stop() {
        let act = parse_activity(&lines("start\n:Do X;\nstop"));
        let kinds: Vec<_> = act.activities.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::Start, ActivityKind::Action, ActivityKind::End]
        );
        assert_eq!(act.activities[1].label, "Do X");
        assert_eq!(edge_pairs(&act), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn test_if_else_fans_out_and_merges() {
        let src = r#"
start
if (A) then (yes)
  :Yes path;
else (B)
  :B path;
endif
stop
"#;
        let act = parse_activity(&lines(src));
        // 0 start, 1 decision, 2 yes, 3 else marker, 4 B path, 5 merge, 6 stop
        assert_eq!(act.activities[1].kind, ActivityKind::Decision);
        assert_eq!(act.activities[3].kind, ActivityKind::ElseMarker);
        assert_eq!(act.activities[5].kind, ActivityKind::Merge);
        assert_eq!(act.activities[5].related_decision, Some(1));

        let pairs = edge_pairs(&act);
        assert!(pairs.contains(&(1, 2)), "decision to yes branch");
        assert!(pairs.contains(&(1, 4)), "decision to else branch");
        assert!(pairs.contains(&(2, 5)), "yes branch rejoins at merge");
        assert!(pairs.contains(&(4, 5)), "else branch rejoins at merge");
        assert!(pairs.contains(&(5, 6)));
        assert!(!pairs.iter().any(|&(from, to)| from == 3 || to == 3));

        let yes = act.edges.iter().find(|e| e.from == 1 && e.to == 2).unwrap();
        assert_eq!(yes.label.as_deref(), Some("yes"));
        let b = act.edges.iter().find(|e| e.from == 1 && e.to == 4).unwrap();
        assert_eq!(b.label.as_deref(), Some("B"));
    }

    #[test]
    fn test_elseif_chain() {
        let src = r#"
if (x > 1) then (big)
  :Big;
elseif (x > 0) then (small)
  :Small;
else (none)
  :None;
endif
"#;
        let act = parse_activity(&lines(src));
        // 0 decision, 1 Big, 2 elseif, 3 Small, 4 else, 5 None, 6 merge
        assert_eq!(act.activities[2].kind, ActivityKind::ElseIfMarker);
        assert_eq!(act.activities[2].related_decision, Some(0));
        let pairs = edge_pairs(&act);
        assert_eq!(
            pairs,
            vec![(0, 1), (0, 3), (0, 5), (1, 6), (3, 6), (5, 6)]
        );
        let mid = act.edges.iter().find(|e| e.to == 3).unwrap();
        assert_eq!(mid.label.as_deref(), Some("x > 0"));
    }

    #[test]
    fn test_empty_branches_route_to_merge() {
        let act = parse_activity(&lines("if (ok?) then (yes)\nelse (no)\n:Fix;\nendif"));
        // 0 decision, 1 else, 2 Fix, 3 merge
        let pairs = edge_pairs(&act);
        assert_eq!(pairs, vec![(0, 3), (0, 2), (2, 3)]);
    }

    #[test]
    fn test_nested_if() {
        let src = r#"
if (a) then (yes)
  if (b) then (yes)
    :inner;
  endif
else (no)
  :outer;
endif
"#;
        let act = parse_activity(&lines(src));
        // 0 d(a), 1 d(b), 2 inner, 3 merge(b), 4 else(a), 5 outer, 6 merge(a)
        assert_eq!(act.activities[3].related_decision, Some(1));
        assert_eq!(act.activities[6].related_decision, Some(0));
        let pairs = edge_pairs(&act);
        assert!(pairs.contains(&(0, 1)));
        assert!(pairs.contains(&(0, 5)));
        assert!(pairs.contains(&(1, 2)));
        assert!(pairs.contains(&(2, 3)));
        assert!(pairs.contains(&(3, 6)), "inner merge rejoins outer merge");
        assert!(pairs.contains(&(5, 6)));
    }

    #[test]
    fn test_swimlanes_and_partitions_capture_membership() {
        let src = r#"
|Customer|
start
:Order;
|#AntiqueWhite|Shop|
partition Billing {
  :Invoice;
}
:Ship;
|Customer|
:Receive;
stop
"#;
        let act = parse_activity(&lines(src));
        assert_eq!(act.swimlanes.len(), 2);
        assert_eq!(act.swimlanes[1].label, "Shop");
        assert_eq!(act.swimlanes[1].color.as_deref(), Some("#AntiqueWhite"));
        assert_eq!(act.swimlanes[0].start_index, 0);
        assert_eq!(act.swimlanes[1].start_index, 2);

        let lane_of = |label: &str| {
            act.activities
                .iter()
                .find(|a| a.label == label)
                .and_then(|a| a.swimlane)
        };
        assert_eq!(lane_of("Order"), Some(0));
        assert_eq!(lane_of("Invoice"), Some(1));
        assert_eq!(lane_of("Receive"), Some(0));

        assert_eq!(act.partitions.len(), 1);
        assert_eq!(act.partitions[0].label, "Billing");
        assert_eq!(act.partitions[0].start_index, 2);
        assert_eq!(act.partitions[0].end_index, Some(3));
        let invoice = act.activities.iter().find(|a| a.label == "Invoice").unwrap();
        assert_eq!(invoice.partition, Some(0));
        let ship = act.activities.iter().find(|a| a.label == "Ship").unwrap();
        assert_eq!(ship.partition, None);
    }

    #[test]
    fn test_unclosed_blocks_at_eof() {
        let act = parse_activity(&lines("partition P {\nif (x) then (y)\n:A;\nelse\n:B;"));
        assert_eq!(act.partitions[0].end_index, Some(act.activities.len()));
        assert!(!act.activities.iter().any(|a| a.kind == ActivityKind::Merge));
        // No merge: the node before the marker has nowhere to go.
        let pairs = edge_pairs(&act);
        assert_eq!(pairs, vec![(0, 1), (0, 3)]);
    }

    #[test]
    fn test_multiline_action_and_terminators() {
        let act = parse_activity(&lines(":first line\nsecond line;\n:Send|\nstop"));
        assert_eq!(act.activities[0].label, "first line\nsecond line");
        assert_eq!(act.activities[1].label, "Send");
        assert_eq!(act.activities.len(), 3);
    }

    #[test]
    fn test_stop_has_no_outgoing_edge() {
        let act = parse_activity(&lines("start\nstop\n:orphan;"));
        assert_eq!(edge_pairs(&act), vec![(0, 1)]);
    }
}
