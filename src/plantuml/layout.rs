//! Per-dialect coordinate assignment.
//!
//! Every position here is a pure function of parse order, so two runs over
//! the same source produce the same geometry.

use std::collections::HashMap;

use super::types::*;
use crate::layout::{LayoutPos, calculate_bbox, layout_grid, layout_ranked, text_width};

pub const MARGIN: f32 = 40.0;

fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}

// ============================================
// Class
// ============================================

pub fn member_text(member: &ClassMember) -> String {
    let marker = member
        .visibility
        .map(|v| format!("{} ", v.marker()))
        .unwrap_or_default();
    match &member.type_name {
        Some(ty) => format!("{}{}: {}", marker, member.name, ty),
        None => format!("{}{}", marker, member.name),
    }
}

pub fn class_size(class: &ClassDef) -> (f32, f32) {
    let widest = class
        .attributes
        .iter()
        .chain(&class.methods)
        .map(|m| text_width(&member_text(m)))
        .fold(text_width(&class.name) + 20.0, f32::max);
    let header = if class.kind == ClassKind::Class { 30.0 } else { 44.0 };
    let mut height = header;
    for section in [&class.attributes, &class.methods] {
        if !section.is_empty() {
            height += 8.0 + section.len() as f32 * 18.0;
        }
    }
    ((widest + 24.0).max(160.0), height.max(40.0))
}

pub fn layout_class(diagram: &ClassDiagram) -> HashMap<String, LayoutPos> {
    let nodes: Vec<(String, (f32, f32))> = diagram
        .classes
        .iter()
        .map(|c| (c.name.clone(), class_size(c)))
        .collect();
    layout_grid(&nodes, MARGIN, MARGIN, 60.0, 60.0)
}

// ============================================
// Sequence
// ============================================

pub const PARTICIPANT_HEADER: f32 = 40.0;
const PARTICIPANT_GAP: f32 = 60.0;
const GROUP_HEADER: f32 = 30.0;
const MESSAGE_STEP: f32 = 40.0;
const SELF_MESSAGE_EXTRA: f32 = 20.0;

#[derive(Debug, Clone, Default)]
pub struct SequenceLayout {
    /// Full lifeline boxes, header included, one per participant.
    pub lifelines: Vec<LayoutPos>,
    /// Arrow y of each message.
    pub message_y: Vec<f32>,
    /// Top and bottom of each group, indexed like the model's groups.
    pub group_top: Vec<f32>,
    pub group_bottom: Vec<f32>,
    pub left: f32,
    pub right: f32,
}

pub fn layout_sequence(diagram: &SequenceDiagram) -> SequenceLayout {
    let mut layout = SequenceLayout {
        left: MARGIN,
        right: MARGIN,
        ..SequenceLayout::default()
    };

    let mut heads: Vec<(f32, f32)> = Vec::with_capacity(diagram.participants.len());
    let mut x = MARGIN;
    for participant in &diagram.participants {
        let width = (text_width(&participant.label) + 30.0).max(100.0);
        heads.push((x, width));
        x += width + PARTICIPANT_GAP;
    }
    if let Some((x, w)) = heads.last() {
        layout.right = x + w;
    }

    let index_of: HashMap<&str, usize> = diagram
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.as_str(), i))
        .collect();

    let groups = &diagram.groups;
    layout.group_top = vec![0.0; groups.len()];
    layout.group_bottom = vec![0.0; groups.len()];
    let mut closed = vec![false; groups.len()];

    let mut cursor = MARGIN + PARTICIPANT_HEADER + 30.0;
    let count = diagram.messages.len();
    for index in 0..=count {
        let mut any_closed = false;
        for (g, group) in groups.iter().enumerate() {
            if group.end_index == Some(index) {
                layout.group_bottom[g] = cursor + 5.0;
                closed[g] = true;
                any_closed = true;
            }
        }
        if any_closed {
            cursor += 15.0;
        }

        for (g, group) in groups.iter().enumerate() {
            if group.start_index == index {
                layout.group_top[g] = cursor;
                cursor += GROUP_HEADER;
            }
        }

        if let Some(message) = diagram.messages.get(index) {
            layout.message_y.push(cursor + 10.0);
            cursor += MESSAGE_STEP;
            if message.from == message.to {
                cursor += SELF_MESSAGE_EXTRA;
            }
            // Wide labels between neighbours push the right edge out
            if let (Some(&a), Some(&b)) = (
                index_of.get(message.from.as_str()),
                index_of.get(message.to.as_str()),
            ) {
                let reach = heads[a.max(b)].0 + heads[a.max(b)].1 / 2.0;
                let needed = heads[a.min(b)].0 + text_width(&message.text) + 40.0;
                layout.right = layout.right.max(needed).max(reach);
            }
        }
    }

    let bottom = cursor + 20.0;
    for (g, group) in groups.iter().enumerate() {
        if group.kind == GroupKind::Fragment && !closed[g] {
            layout.group_bottom[g] = bottom - 10.0;
        }
    }

    layout.lifelines = heads
        .into_iter()
        .map(|(x, w)| LayoutPos::new(x, MARGIN, w, bottom - MARGIN))
        .collect();
    layout
}

// ============================================
// Activity
// ============================================

const COLUMN_WIDTH: f32 = 200.0;
const LANE_HEADER: f32 = 30.0;
const ACTIVITY_GAP: f32 = 30.0;

pub fn activity_size(activity: &Activity) -> (f32, f32) {
    match activity.kind {
        ActivityKind::Start | ActivityKind::End | ActivityKind::Merge => (30.0, 30.0),
        ActivityKind::Fork => (160.0, 8.0),
        ActivityKind::Decision => ((text_width(&activity.label) + 50.0).max(100.0), 60.0),
        ActivityKind::Action => (
            (text_width(&activity.label) + 30.0).max(120.0),
            40.0 + 16.0 * (line_count(&activity.label) - 1) as f32,
        ),
        ActivityKind::ElseIfMarker | ActivityKind::ElseMarker => (0.0, 0.0),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLayout {
    /// One slot per activity; branch markers have no position.
    pub nodes: Vec<Option<LayoutPos>>,
    pub lanes: Vec<LayoutPos>,
    pub partitions: Vec<Option<LayoutPos>>,
}

/// An `if` being laid out: branches go side by side, each in a new column.
struct BranchFrame {
    decision: usize,
    column: usize,
    widest_column: usize,
    top: f32,
    bottom: f32,
}

pub fn layout_activity(diagram: &ActivityDiagram) -> ActivityLayout {
    let has_lanes = !diagram.swimlanes.is_empty();
    let top = if has_lanes { MARGIN + LANE_HEADER + 20.0 } else { MARGIN };

    // Pass 1: column and y per activity
    let mut slots: Vec<Option<(usize, f32)>> = Vec::with_capacity(diagram.activities.len());
    let mut frames: Vec<BranchFrame> = Vec::new();
    let mut column = 0usize;
    let mut y = top;

    for activity in &diagram.activities {
        let (_, height) = activity_size(activity);
        match activity.kind {
            ActivityKind::ElseIfMarker | ActivityKind::ElseMarker => {
                slots.push(None);
                let Some(frame) = frames.last_mut() else {
                    continue;
                };
                if activity.related_decision != Some(frame.decision) {
                    continue;
                }
                frame.bottom = frame.bottom.max(y);
                frame.widest_column += 1;
                column = frame.widest_column;
                y = frame.top;
            }
            ActivityKind::Merge => {
                let is_ours = frames
                    .last()
                    .is_some_and(|f| activity.related_decision == Some(f.decision));
                if is_ours && let Some(frame) = frames.pop() {
                    y = frame.bottom.max(y);
                    column = frame.column;
                    if let Some(parent) = frames.last_mut() {
                        parent.widest_column = parent.widest_column.max(frame.widest_column);
                    }
                }
                slots.push(Some((column, y)));
                y += height + ACTIVITY_GAP;
            }
            ActivityKind::Decision => {
                slots.push(Some((column, y)));
                y += height + ACTIVITY_GAP;
                frames.push(BranchFrame {
                    decision: activity.id,
                    column,
                    widest_column: column,
                    top: y,
                    bottom: y,
                });
            }
            _ => {
                slots.push(Some((column, y)));
                y += height + ACTIVITY_GAP;
            }
        }
    }
    let bottom = frames.iter().map(|f| f.bottom).fold(y, f32::max);

    // Pass 2: lane widths from the widest column used in each lane
    let lane_count = diagram.swimlanes.len().max(1);
    let mut lane_columns = vec![0usize; lane_count];
    for (activity, slot) in diagram.activities.iter().zip(&slots) {
        if let Some((col, _)) = slot {
            let lane = activity.swimlane.unwrap_or(0).min(lane_count - 1);
            lane_columns[lane] = lane_columns[lane].max(*col);
        }
    }
    let mut lane_x = Vec::with_capacity(lane_count);
    let mut x = MARGIN;
    for cols in &lane_columns {
        lane_x.push(x);
        x += (*cols + 1) as f32 * COLUMN_WIDTH + 20.0;
    }

    let mut layout = ActivityLayout::default();
    for (activity, slot) in diagram.activities.iter().zip(&slots) {
        let pos = slot.map(|(col, y)| {
            let lane = activity.swimlane.unwrap_or(0).min(lane_count - 1);
            let center = lane_x[lane] + 10.0 + col as f32 * COLUMN_WIDTH + COLUMN_WIDTH / 2.0;
            let (w, h) = activity_size(activity);
            LayoutPos::new(center - w / 2.0, y, w, h)
        });
        layout.nodes.push(pos);
    }

    if has_lanes {
        for (lane, cols) in lane_columns.iter().enumerate() {
            layout.lanes.push(LayoutPos::new(
                lane_x[lane],
                MARGIN,
                (*cols + 1) as f32 * COLUMN_WIDTH + 20.0,
                bottom - MARGIN + 10.0,
            ));
        }
    }

    for partition in &diagram.partitions {
        let end = partition.end_index.unwrap_or(diagram.activities.len());
        let members = layout
            .nodes
            .get(partition.start_index..end.min(layout.nodes.len()))
            .unwrap_or_default()
            .iter()
            .flatten();
        let bbox = calculate_bbox(members);
        if bbox.width <= 0.0 && bbox.height <= 0.0 {
            layout.partitions.push(None);
            continue;
        }
        let padded = bbox.with_padding(15.0);
        layout.partitions.push(Some(LayoutPos::new(
            padded.x,
            padded.y - 20.0,
            padded.width,
            padded.height + 20.0,
        )));
    }

    layout
}

// ============================================
// State
// ============================================

pub fn state_size(state: &State) -> (f32, f32) {
    match state.kind {
        StateKind::Start | StateKind::End => (30.0, 30.0),
        StateKind::State => (
            (text_width(&state.label) + 30.0).max(120.0),
            40.0 + 16.0 * (line_count(&state.label) - 1) as f32,
        ),
    }
}

pub fn layout_state(diagram: &StateDiagram) -> HashMap<String, LayoutPos> {
    let nodes: Vec<(String, (f32, f32))> = diagram
        .states
        .iter()
        .map(|s| (s.id.clone(), state_size(s)))
        .collect();
    let edges: Vec<(String, String)> = diagram
        .transitions
        .iter()
        .map(|t| (t.from.clone(), t.to.clone()))
        .collect();
    layout_ranked(&nodes, &edges, MARGIN, MARGIN, 60.0, 60.0)
}

// ============================================
// Usecase
// ============================================

#[derive(Debug, Clone, Default)]
pub struct UsecaseLayout {
    pub actors: HashMap<String, LayoutPos>,
    pub usecases: HashMap<String, LayoutPos>,
    pub rectangles: Vec<LayoutPos>,
}

fn usecase_size(usecase: &Usecase) -> (f32, f32) {
    ((text_width(&usecase.label) + 40.0).max(140.0), 50.0)
}

pub fn layout_usecase(diagram: &UsecaseDiagram) -> UsecaseLayout {
    let mut layout = UsecaseLayout::default();

    for (i, actor) in diagram.actors.iter().enumerate() {
        layout.actors.insert(
            actor.name.clone(),
            LayoutPos::new(MARGIN, MARGIN + i as f32 * 110.0, 30.0, 60.0),
        );
    }

    let column_x = if diagram.actors.is_empty() { MARGIN } else { MARGIN + 150.0 };
    let mut y = MARGIN;
    let mut widest_rect: f32 = 0.0;
    for (r, _) in diagram.rectangles.iter().enumerate() {
        let members: Vec<&Usecase> = diagram
            .usecases
            .iter()
            .filter(|u| u.rectangle == Some(r))
            .collect();
        let inner_width = members
            .iter()
            .map(|u| usecase_size(u).0)
            .fold(160.0, f32::max);
        let width = inner_width + 60.0;
        for (j, usecase) in members.iter().enumerate() {
            let (w, h) = usecase_size(usecase);
            layout.usecases.insert(
                usecase.name.clone(),
                LayoutPos::new(column_x + (width - w) / 2.0, y + 40.0 + j as f32 * 80.0, w, h),
            );
        }
        let height = (50.0 + members.len() as f32 * 80.0).max(90.0);
        layout.rectangles.push(LayoutPos::new(column_x, y, width, height));
        widest_rect = widest_rect.max(width);
        y += height + 40.0;
    }

    let free_x = if diagram.rectangles.is_empty() {
        column_x
    } else {
        column_x + widest_rect + 80.0
    };
    let free = diagram.usecases.iter().filter(|u| u.rectangle.is_none());
    for (k, usecase) in free.enumerate() {
        let (w, h) = usecase_size(usecase);
        layout.usecases.insert(
            usecase.name.clone(),
            LayoutPos::new(free_x, MARGIN + k as f32 * 80.0, w, h),
        );
    }

    layout
}

// ============================================
// Mindmap
// ============================================

const MINDMAP_LEVEL_STEP: f32 = 200.0;
const MINDMAP_ROW_STEP: f32 = 60.0;

fn mindmap_size(node: &MindmapNode) -> (f32, f32) {
    ((text_width(&node.text) + 30.0).max(100.0), 40.0)
}

/// Roots in a centre column, each side fanning out one column per level,
/// rows in order of appearance per side.
pub fn layout_mindmap(diagram: &MindmapDiagram) -> Vec<LayoutPos> {
    fn is_root(node: &MindmapNode) -> bool {
        node.parent.is_none()
    }

    let left_depth = diagram
        .nodes
        .iter()
        .filter(|n| !is_root(n) && n.side == Side::Left)
        .map(|n| n.level.saturating_sub(1))
        .max()
        .unwrap_or(0);
    let center_x = MARGIN + left_depth as f32 * MINDMAP_LEVEL_STEP + 60.0;

    let right_rows = diagram
        .nodes
        .iter()
        .filter(|n| !is_root(n) && n.side == Side::Right)
        .count();
    let left_rows = diagram
        .nodes
        .iter()
        .filter(|n| !is_root(n) && n.side == Side::Left)
        .count();
    let root_offset = right_rows.max(left_rows).saturating_sub(1) as f32 * MINDMAP_ROW_STEP / 2.0;

    let (mut right, mut left, mut roots) = (0usize, 0usize, 0usize);
    diagram
        .nodes
        .iter()
        .map(|node| {
            let (w, h) = mindmap_size(node);
            if is_root(node) {
                let y = MARGIN + root_offset + roots as f32 * MINDMAP_ROW_STEP;
                roots += 1;
                return LayoutPos::new(center_x - w / 2.0, y, w, h);
            }
            let depth = node.level.saturating_sub(1).max(1) as f32 * MINDMAP_LEVEL_STEP;
            let (cx, row) = match node.side {
                Side::Right => {
                    right += 1;
                    (center_x + depth, right - 1)
                }
                Side::Left => {
                    left += 1;
                    (center_x - depth, left - 1)
                }
            };
            LayoutPos::new(cx - w / 2.0, MARGIN + row as f32 * MINDMAP_ROW_STEP, w, h)
        })
        .collect()
}

// ============================================
// ER
// ============================================

pub fn er_attribute_text(attribute: &ErAttribute) -> String {
    match &attribute.type_name {
        Some(ty) => format!("{} : {}", attribute.name, ty),
        None => attribute.name.clone(),
    }
}

pub fn er_size(entity: &ErEntity) -> (f32, f32) {
    let widest = entity
        .attributes
        .iter()
        .map(|a| text_width(&er_attribute_text(a)) + 20.0)
        .fold(text_width(&entity.label), f32::max);
    (
        (widest + 30.0).max(160.0),
        30.0 + entity.attributes.len().max(1) as f32 * 22.0,
    )
}

pub fn layout_er(diagram: &ErDiagram) -> HashMap<String, LayoutPos> {
    let nodes: Vec<(String, (f32, f32))> = diagram
        .entities
        .iter()
        .map(|e| (e.id.clone(), er_size(e)))
        .collect();
    let edges: Vec<(String, String)> = diagram
        .relationships
        .iter()
        .map(|r| (r.from.clone(), r.to.clone()))
        .collect();
    layout_ranked(&nodes, &edges, MARGIN, MARGIN, 80.0, 80.0)
}

// ============================================
// Deployment
// ============================================

pub fn deployment_size(node: &DeploymentNode) -> (f32, f32) {
    let base = match node.kind {
        DeploymentKind::Actor => return (30.0, 60.0),
        DeploymentKind::Database | DeploymentKind::Storage => (80.0, 90.0),
        DeploymentKind::Cloud => (140.0, 90.0),
        DeploymentKind::Node | DeploymentKind::Folder | DeploymentKind::Package => (140.0, 80.0),
        DeploymentKind::Frame => (160.0, 100.0),
        DeploymentKind::Artifact | DeploymentKind::Queue => (120.0, 50.0),
        DeploymentKind::File => (100.0, 60.0),
        DeploymentKind::Component
        | DeploymentKind::Rectangle
        | DeploymentKind::Card
        | DeploymentKind::Agent
        | DeploymentKind::Stack => (130.0, 60.0),
    };
    ((text_width(&node.label) + 30.0).max(base.0), base.1)
}

pub fn layout_deployment(diagram: &DeploymentDiagram) -> HashMap<String, LayoutPos> {
    let nodes: Vec<(String, (f32, f32))> = diagram
        .nodes
        .iter()
        .map(|n| (n.id.clone(), deployment_size(n)))
        .collect();
    layout_grid(&nodes, MARGIN, MARGIN, 80.0, 80.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plantuml::normalize::normalize;
    use crate::plantuml::parser::{parse_activity, parse_mindmap, parse_sequence, parse_usecase};

    #[test]
    fn test_branches_sit_side_by_side_and_merge_below() {
        let src = "start\nif (ok?) then (yes)\n:A;\n:A2;\nelse (no)\n:B;\nendif\nstop";
        let diagram = parse_activity(&normalize(src));
        let layout = layout_activity(&diagram);
        let pos = |label: &str| {
            let idx = diagram.activities.iter().position(|a| a.label == label).unwrap();
            layout.nodes[idx].unwrap()
        };
        let a = pos("A");
        let b = pos("B");
        assert_eq!(a.y, b.y);
        assert!(b.x > a.right());

        let merge = diagram
            .activities
            .iter()
            .position(|a| a.kind == ActivityKind::Merge)
            .unwrap();
        let merge = layout.nodes[merge].unwrap();
        assert!(merge.y > pos("A2").bottom());
        let markers = diagram.activities.iter().filter(|a| a.kind.is_marker()).count();
        assert_eq!(layout.nodes.iter().filter(|n| n.is_none()).count(), markers);
    }

    #[test]
    fn test_lanes_and_partitions_enclose_members() {
        let src = "|Client|\nstart\npartition Work {\n:A;\n}\n|Server|\n:B;\nstop";
        let diagram = parse_activity(&normalize(src));
        let layout = layout_activity(&diagram);
        assert_eq!(layout.lanes.len(), 2);
        assert!(layout.lanes[1].x >= layout.lanes[0].right());

        let b = layout.nodes[2].unwrap();
        assert!(b.x >= layout.lanes[1].x && b.right() <= layout.lanes[1].right());

        let part = layout.partitions[0].unwrap();
        let a = layout.nodes[1].unwrap();
        assert!(part.x < a.x && part.right() > a.right());
        assert!(part.y < a.y && part.bottom() > a.bottom());
    }

    #[test]
    fn test_sequence_rows_advance_and_fragments_span() {
        let src = "A -> B : one\nalt ok\nB -> A : two\nend\nA -> A : self";
        let diagram = parse_sequence(&normalize(src));
        let layout = layout_sequence(&diagram);
        assert_eq!(layout.lifelines.len(), 2);
        assert!(layout.message_y.windows(2).all(|w| w[1] > w[0]));
        assert!(layout.group_top[0] < layout.message_y[1]);
        assert!(layout.group_bottom[0] > layout.message_y[1]);
        assert!(layout.group_bottom[0] < layout.message_y[2]);
        let lifeline = layout.lifelines[0];
        assert!(lifeline.bottom() > layout.message_y[2]);
    }

    #[test]
    fn test_mindmap_sides_fan_out_from_root() {
        let diagram = parse_mindmap(&normalize("+ Root\n++ R1\n++ R2\n-- L1"));
        let pos = layout_mindmap(&diagram);
        let root = pos[0].center().0;
        assert!(pos[1].center().0 > root);
        assert!(pos[3].center().0 < root);
        assert!(pos[2].y > pos[1].y);
        assert!(pos[3].x >= MARGIN);
    }

    #[test]
    fn test_usecases_inside_their_rectangle() {
        let src = "actor User\nrectangle Shop {\n(Buy)\n(Pay)\n}\n(Browse)";
        let diagram = parse_usecase(&normalize(src));
        let layout = layout_usecase(&diagram);
        let rect = layout.rectangles[0];
        for name in ["Buy", "Pay"] {
            let u = layout.usecases[name];
            assert!(u.x >= rect.x && u.right() <= rect.right());
            assert!(u.y >= rect.y && u.bottom() <= rect.bottom());
        }
        assert!(layout.usecases["Browse"].x >= rect.right());
        assert!(layout.actors["User"].right() < rect.x);
    }
}
