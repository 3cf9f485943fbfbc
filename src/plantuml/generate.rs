//! Cell emission for the eight dialects.
//!
//! Each dialect lays its model out, then writes vertices and edges through a
//! [`GeneratorContext`]. Edges whose endpoints were never emitted are
//! dropped here.

use std::collections::HashMap;

use log::{debug, trace};

use super::layout::*;
use super::parser::ParsedDiagram;
use super::types::*;
use crate::config::ConvertOptions;
use crate::drawio::{EdgeGeometry, GeneratorContext};
use crate::layout::LayoutPos;
use crate::xml::escape_html;

// ============================================
// Style tables
// ============================================

const CLASS_STYLE: &str = "verticalAlign=top;align=left;overflow=fill;fontSize=12;fontFamily=Helvetica;html=1;whiteSpace=wrap;fillColor=#dae8fc;strokeColor=#6c8ebf;";
const INTERFACE_STYLE: &str = "verticalAlign=top;align=left;overflow=fill;fontSize=12;fontFamily=Helvetica;html=1;whiteSpace=wrap;fillColor=#e1d5e7;strokeColor=#9673a6;";
const ENUM_STYLE: &str = "verticalAlign=top;align=left;overflow=fill;fontSize=12;fontFamily=Helvetica;html=1;whiteSpace=wrap;fillColor=#fff2cc;strokeColor=#d6b656;";

const LIFELINE_STYLE: &str = "shape=umlLifeline;perimeter=lifelinePerimeter;whiteSpace=wrap;container=0;collapsible=0;recursiveResize=0;outlineConnect=0;portConstraint=eastwest;size=40;";
const FRAGMENT_STYLE: &str = "shape=umlFrame;whiteSpace=wrap;pointerEvents=0;recursiveResize=0;container=0;collapsible=0;width=90;height=20;fillColor=none;";
const BRANCH_STYLE: &str = "line;dashed=1;strokeWidth=1;fillColor=none;align=left;verticalAlign=top;spacingTop=-4;spacingLeft=10;fontStyle=2;";
const SEPARATOR_STYLE: &str = "rounded=0;whiteSpace=wrap;fillColor=#eeeeee;strokeColor=#666666;fontStyle=1;";

const START_STYLE: &str = "ellipse;fillColor=#000000;strokeColor=#000000;";
const END_STYLE: &str = "ellipse;shape=endState;fillColor=#000000;strokeColor=#ff0000;";
const ACTION_STYLE: &str = "rounded=1;whiteSpace=wrap;arcSize=40;fillColor=#ffffc0;strokeColor=#b85450;";
const DECISION_STYLE: &str = "rhombus;whiteSpace=wrap;fillColor=#ffff88;strokeColor=#36393d;";
const MERGE_STYLE: &str = "rhombus;fillColor=#ffff88;strokeColor=#36393d;";
const FORK_STYLE: &str = "rounded=0;fillColor=#000000;strokeColor=#000000;";
const FLOW_STYLE: &str = "edgeStyle=orthogonalEdgeStyle;rounded=0;endArrow=open;endSize=8;verticalAlign=bottom;";
const LANE_STYLE: &str = "swimlane;startSize=30;fillColor=none;";
const PARTITION_STYLE: &str = "rounded=0;dashed=1;fillColor=none;verticalAlign=top;align=left;spacingLeft=8;fontStyle=1;";

const STATE_STYLE: &str = "rounded=1;whiteSpace=wrap;arcSize=30;fillColor=#dae8fc;strokeColor=#6c8ebf;";
const TRANSITION_STYLE: &str = "endArrow=open;endSize=8;verticalAlign=bottom;";

const ACTOR_STYLE: &str = "shape=umlActor;verticalLabelPosition=bottom;verticalAlign=top;outlineConnect=0;";
const USECASE_STYLE: &str = "ellipse;whiteSpace=wrap;fillColor=#dae8fc;strokeColor=#6c8ebf;";
const RECTANGLE_STYLE: &str = "rounded=0;fillColor=none;verticalAlign=top;fontStyle=1;";
const LINK_STYLE: &str = "endArrow=open;endSize=8;";

const MINDMAP_ROOT_STYLE: &str = "ellipse;whiteSpace=wrap;fillColor=#f8cecc;strokeColor=#b85450;fontStyle=1;";
const MINDMAP_BRANCH_STYLE: &str = "rounded=1;whiteSpace=wrap;fillColor=#dae8fc;strokeColor=#6c8ebf;";
const MINDMAP_LEAF_STYLE: &str = "rounded=1;whiteSpace=wrap;fillColor=#d5e8d4;strokeColor=#82b366;";
const MINDMAP_EDGE_STYLE: &str = "endArrow=none;curved=1;";

const ENTITY_STYLE: &str = "verticalAlign=top;align=left;overflow=fill;html=1;whiteSpace=wrap;fillColor=#f5f5f5;strokeColor=#666666;";

fn relation_style(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Extends => "endArrow=block;endFill=0;endSize=12;",
        RelationKind::Implements => "endArrow=block;endFill=0;endSize=12;dashed=1;",
        RelationKind::Composition => "startArrow=diamondThin;startFill=1;startSize=14;endArrow=none;",
        RelationKind::Aggregation => "startArrow=diamondThin;startFill=0;startSize=14;endArrow=none;",
        RelationKind::Association => "endArrow=open;endFill=0;",
        RelationKind::Dependency => "endArrow=open;endFill=0;dashed=1;",
    }
}

fn deployment_style(kind: DeploymentKind) -> &'static str {
    match kind {
        DeploymentKind::Node => "shape=cube;whiteSpace=wrap;size=10;fillColor=#dae8fc;strokeColor=#6c8ebf;",
        DeploymentKind::Database | DeploymentKind::Storage => {
            "shape=cylinder3;whiteSpace=wrap;boundedLbl=1;size=15;fillColor=#fff2cc;strokeColor=#d6b656;"
        }
        DeploymentKind::Cloud => "ellipse;shape=cloud;whiteSpace=wrap;fillColor=#f5f5f5;strokeColor=#666666;",
        DeploymentKind::Artifact | DeploymentKind::File => {
            "shape=note;whiteSpace=wrap;size=14;fillColor=#ffffff;strokeColor=#000000;"
        }
        DeploymentKind::Component => "shape=component;align=left;spacingLeft=36;whiteSpace=wrap;",
        DeploymentKind::Folder | DeploymentKind::Package => {
            "shape=folder;tabWidth=50;tabHeight=14;tabPosition=left;whiteSpace=wrap;"
        }
        DeploymentKind::Frame => "shape=umlFrame;whiteSpace=wrap;width=80;height=20;",
        DeploymentKind::Queue => "shape=cylinder3;direction=south;whiteSpace=wrap;size=12;fillColor=#e1d5e7;strokeColor=#9673a6;",
        DeploymentKind::Card => "shape=card;whiteSpace=wrap;size=14;",
        DeploymentKind::Agent => "rounded=1;whiteSpace=wrap;",
        DeploymentKind::Stack => "rounded=0;whiteSpace=wrap;shadow=1;",
        DeploymentKind::Rectangle => "rounded=0;whiteSpace=wrap;",
        DeploymentKind::Actor => ACTOR_STYLE,
    }
}

fn er_arrow(cardinality: &str) -> &'static str {
    match cardinality {
        "0..1" => "ERzeroToOne",
        "1..*" => "ERoneToMany",
        "0..*" => "ERzeroToMany",
        _ => "ERmandOne",
    }
}

// ============================================
// Entry points
// ============================================

/// Render a parsed diagram into a complete `<mxfile>` document.
pub fn generate(diagram: &ParsedDiagram, options: &ConvertOptions) -> String {
    let mut ctx = GeneratorContext::new();
    render_cells(&mut ctx, diagram);
    trace!(dialect:% = diagram.dialect(), cells = ctx.cell_count(); "Generated cells");
    ctx.finish(options)
}

/// Emit the cells of one diagram into `ctx`.
pub fn render_cells(ctx: &mut GeneratorContext, diagram: &ParsedDiagram) {
    match diagram {
        ParsedDiagram::Class(d) => render_class(ctx, d),
        ParsedDiagram::Sequence(d) => render_sequence(ctx, d),
        ParsedDiagram::Activity(d) => render_activity(ctx, d),
        ParsedDiagram::State(d) => render_state(ctx, d),
        ParsedDiagram::Usecase(d) => render_usecase(ctx, d),
        ParsedDiagram::Mindmap(d) => render_mindmap(ctx, d),
        ParsedDiagram::Er(d) => render_er(ctx, d),
        ParsedDiagram::Deployment(d) => render_deployment(ctx, d),
    }
}

fn label(text: &Option<String>) -> &str {
    text.as_deref().unwrap_or_default()
}

/// Connect two named endpoints, skipping edges that reference unknown nodes.
fn connect(
    ctx: &mut GeneratorContext,
    ids: &HashMap<String, String>,
    from: &str,
    to: &str,
    value: &str,
    style: &str,
) -> Option<String> {
    match (ids.get(from), ids.get(to)) {
        (Some(source), Some(target)) => Some(ctx.add_edge(source, target, value, style)),
        _ => {
            debug!(from:% = from, to:% = to; "Dropping edge with unresolved endpoint");
            None
        }
    }
}

// ============================================
// Class
// ============================================

fn class_label(class: &ClassDef) -> String {
    let stereotype = match class.kind {
        ClassKind::Interface => "&laquo;interface&raquo;<br>",
        ClassKind::Enum => "&laquo;enumeration&raquo;<br>",
        ClassKind::Abstract => "&laquo;abstract&raquo;<br>",
        ClassKind::Class => "",
    };
    let name = escape_html(&class.name);
    let name = if class.kind == ClassKind::Abstract {
        format!("<i>{}</i>", name)
    } else {
        name
    };

    let mut html = format!(
        r#"<p style="margin:0px;margin-top:4px;text-align:center;">{}<b>{}</b></p>"#,
        stereotype, name
    );
    for section in [&class.attributes, &class.methods] {
        if section.is_empty() {
            continue;
        }
        let lines: Vec<String> = section.iter().map(|m| escape_html(&member_text(m))).collect();
        html.push_str(r#"<hr size="1"/><p style="margin:0px;margin-left:4px;">"#);
        html.push_str(&lines.join("<br>"));
        html.push_str("</p>");
    }
    html
}

fn render_class(ctx: &mut GeneratorContext, diagram: &ClassDiagram) {
    let positions = layout_class(diagram);
    let mut ids = HashMap::new();

    for class in &diagram.classes {
        let Some(pos) = positions.get(&class.name) else {
            continue;
        };
        let style = match class.kind {
            ClassKind::Interface => INTERFACE_STYLE,
            ClassKind::Enum => ENUM_STYLE,
            ClassKind::Class | ClassKind::Abstract => CLASS_STYLE,
        };
        let id = ctx.add_vertex(&class_label(class), style, pos);
        ids.insert(class.name.clone(), id);
    }

    for relation in &diagram.relations {
        connect(
            ctx,
            &ids,
            &relation.from,
            &relation.to,
            label(&relation.label),
            relation_style(relation.kind),
        );
    }
}

// ============================================
// Sequence
// ============================================

fn render_sequence(ctx: &mut GeneratorContext, diagram: &SequenceDiagram) {
    let layout = layout_sequence(diagram);
    let span_x = layout.left - 20.0;
    let span_width = layout.right - layout.left + 40.0;

    // Frames first so lifelines and arrows draw over them
    for (g, group) in diagram.groups.iter().enumerate() {
        let top = layout.group_top[g];
        match group.kind {
            GroupKind::Fragment => {
                let height = (layout.group_bottom[g] - top).max(30.0);
                ctx.add_vertex(
                    &group.label,
                    FRAGMENT_STYLE,
                    &LayoutPos::new(span_x, top, span_width, height),
                );
            }
            GroupKind::Branch => {
                ctx.add_vertex(
                    &format!("[{}]", group.label),
                    BRANCH_STYLE,
                    &LayoutPos::new(span_x, top + 5.0, span_width, 10.0),
                );
            }
            GroupKind::Separator => {
                ctx.add_vertex(
                    &group.label,
                    SEPARATOR_STYLE,
                    &LayoutPos::new(span_x, top + 2.0, span_width, 20.0),
                );
            }
        }
    }

    let mut ids = HashMap::new();
    let mut lifelines: HashMap<&str, LayoutPos> = HashMap::new();
    for (participant, pos) in diagram.participants.iter().zip(&layout.lifelines) {
        let style = match participant.kind {
            ParticipantKind::Actor => format!("{}participant=umlActor;", LIFELINE_STYLE),
            ParticipantKind::Participant => LIFELINE_STYLE.to_string(),
        };
        let id = ctx.add_vertex(&participant.label, &style, pos);
        ids.insert(participant.name.clone(), id);
        lifelines.insert(participant.name.as_str(), *pos);
    }

    for (message, &y) in diagram.messages.iter().zip(&layout.message_y) {
        let (Some(source), Some(target), Some(from), Some(to)) = (
            ids.get(&message.from),
            ids.get(&message.to),
            lifelines.get(message.from.as_str()),
            lifelines.get(message.to.as_str()),
        ) else {
            continue;
        };

        let (from_x, _) = from.center();
        let (to_x, _) = to.center();
        let mut style = String::from("verticalAlign=bottom;");
        style.push_str(if message.is_async {
            "endArrow=open;endFill=0;"
        } else {
            "endArrow=block;endFill=1;"
        });
        if message.is_dashed {
            style.push_str("dashed=1;");
        }

        let mut geometry = EdgeGeometry {
            source_point: Some((from_x, y)),
            target_point: Some((to_x, y)),
            waypoints: Vec::new(),
        };
        let mut target_y = y;
        if source == target {
            target_y = y + 20.0;
            geometry.target_point = Some((to_x, target_y));
            geometry.waypoints = vec![(from_x + 40.0, y), (from_x + 40.0, target_y)];
        }
        style.push_str(&format!(
            "exitX=0.5;exitY={:.3};entryX=0.5;entryY={:.3};",
            (y - from.y) / from.height,
            (target_y - to.y) / to.height
        ));

        let (source, target) = (source.clone(), target.clone());
        ctx.add_edge_with(&source, &target, &message.text, &style, &geometry);
    }
}

// ============================================
// Activity
// ============================================

fn render_activity(ctx: &mut GeneratorContext, diagram: &ActivityDiagram) {
    let layout = layout_activity(diagram);

    for (lane, pos) in diagram.swimlanes.iter().zip(&layout.lanes) {
        let style = match &lane.color {
            Some(color) => format!("{}fillColor={};", LANE_STYLE.trim_end_matches("fillColor=none;"), color),
            None => LANE_STYLE.to_string(),
        };
        ctx.add_vertex(&lane.label, &style, pos);
    }

    for (partition, pos) in diagram.partitions.iter().zip(&layout.partitions) {
        let Some(pos) = pos else {
            continue;
        };
        let style = match &partition.color {
            Some(color) => format!("{}fillColor={};", PARTITION_STYLE.replace("fillColor=none;", ""), color),
            None => PARTITION_STYLE.to_string(),
        };
        ctx.add_vertex(&partition.label, &style, pos);
    }

    let mut ids: HashMap<usize, String> = HashMap::new();
    for (activity, pos) in diagram.activities.iter().zip(&layout.nodes) {
        let Some(pos) = pos else {
            continue;
        };
        let (style, value) = match activity.kind {
            ActivityKind::Start => (START_STYLE, ""),
            ActivityKind::End => (END_STYLE, ""),
            ActivityKind::Action => (ACTION_STYLE, activity.label.as_str()),
            ActivityKind::Decision => (DECISION_STYLE, activity.label.as_str()),
            ActivityKind::Merge => (MERGE_STYLE, ""),
            ActivityKind::Fork => (FORK_STYLE, ""),
            ActivityKind::ElseIfMarker | ActivityKind::ElseMarker => continue,
        };
        ids.insert(activity.id, ctx.add_vertex(value, style, pos));
    }

    for edge in &diagram.edges {
        if let (Some(source), Some(target)) = (ids.get(&edge.from), ids.get(&edge.to)) {
            ctx.add_edge(source, target, label(&edge.label), FLOW_STYLE);
        }
    }
}

// ============================================
// State
// ============================================

fn render_state(ctx: &mut GeneratorContext, diagram: &StateDiagram) {
    let positions = layout_state(diagram);
    let mut ids = HashMap::new();

    for state in &diagram.states {
        let Some(pos) = positions.get(&state.id) else {
            continue;
        };
        let (style, value) = match state.kind {
            StateKind::Start => (START_STYLE, ""),
            StateKind::End => (END_STYLE, ""),
            StateKind::State => (STATE_STYLE, state.label.as_str()),
        };
        ids.insert(state.id.clone(), ctx.add_vertex(value, style, pos));
    }

    for transition in &diagram.transitions {
        connect(
            ctx,
            &ids,
            &transition.from,
            &transition.to,
            label(&transition.label),
            TRANSITION_STYLE,
        );
    }
}

// ============================================
// Usecase
// ============================================

fn render_usecase(ctx: &mut GeneratorContext, diagram: &UsecaseDiagram) {
    let layout = layout_usecase(diagram);
    let mut ids = HashMap::new();

    for (rectangle, pos) in diagram.rectangles.iter().zip(&layout.rectangles) {
        ctx.add_vertex(&rectangle.label, RECTANGLE_STYLE, pos);
    }
    for actor in &diagram.actors {
        if let Some(pos) = layout.actors.get(&actor.name) {
            ids.insert(actor.name.clone(), ctx.add_vertex(&actor.label, ACTOR_STYLE, pos));
        }
    }
    for usecase in &diagram.usecases {
        if let Some(pos) = layout.usecases.get(&usecase.name) {
            ids.insert(usecase.name.clone(), ctx.add_vertex(&usecase.label, USECASE_STYLE, pos));
        }
    }

    for link in &diagram.links {
        let style = if link.is_dashed {
            format!("{}dashed=1;", LINK_STYLE)
        } else {
            LINK_STYLE.to_string()
        };
        connect(ctx, &ids, &link.from, &link.to, label(&link.label), &style);
    }
}

// ============================================
// Mindmap
// ============================================

fn render_mindmap(ctx: &mut GeneratorContext, diagram: &MindmapDiagram) {
    let positions = layout_mindmap(diagram);
    let mut ids: Vec<String> = Vec::with_capacity(diagram.nodes.len());

    for (node, pos) in diagram.nodes.iter().zip(&positions) {
        let style = match (node.parent, node.level) {
            (None, _) => MINDMAP_ROOT_STYLE,
            (Some(_), 0..=2) => MINDMAP_BRANCH_STYLE,
            _ => MINDMAP_LEAF_STYLE,
        };
        ids.push(ctx.add_vertex(&node.text, style, pos));
    }

    for node in &diagram.nodes {
        if let Some(parent) = node.parent {
            let (source, target) = (ids[parent].clone(), ids[node.id].clone());
            ctx.add_edge(&source, &target, "", MINDMAP_EDGE_STYLE);
        }
    }
}

// ============================================
// ER
// ============================================

fn entity_label(entity: &ErEntity) -> String {
    let mut html = format!(
        r#"<p style="margin:0px;margin-top:4px;text-align:center;"><b>{}</b></p><hr size="1"/>"#,
        escape_html(&entity.label)
    );
    let lines: Vec<String> = entity
        .attributes
        .iter()
        .map(|a| {
            let text = escape_html(&er_attribute_text(a));
            if a.is_primary_key {
                format!("<u>{}</u> (PK)", text)
            } else {
                text
            }
        })
        .collect();
    html.push_str(r#"<p style="margin:0px;margin-left:4px;">"#);
    html.push_str(&lines.join("<br>"));
    html.push_str("</p>");
    html
}

fn render_er(ctx: &mut GeneratorContext, diagram: &ErDiagram) {
    let positions = layout_er(diagram);
    let mut ids = HashMap::new();

    for entity in &diagram.entities {
        if let Some(pos) = positions.get(&entity.id) {
            ids.insert(entity.id.clone(), ctx.add_vertex(&entity_label(entity), ENTITY_STYLE, pos));
        }
    }

    for relationship in &diagram.relationships {
        let (from_card, to_card) = &relationship.cardinalities;
        let style = format!(
            "edgeStyle=entityRelationEdgeStyle;startArrow={};endArrow={};startFill=0;endFill=0;",
            er_arrow(from_card),
            er_arrow(to_card)
        );
        connect(
            ctx,
            &ids,
            &relationship.from,
            &relationship.to,
            label(&relationship.label),
            &style,
        );
    }
}

// ============================================
// Deployment
// ============================================

fn render_deployment(ctx: &mut GeneratorContext, diagram: &DeploymentDiagram) {
    let positions = layout_deployment(diagram);
    let mut ids = HashMap::new();

    for node in &diagram.nodes {
        if let Some(pos) = positions.get(&node.id) {
            ids.insert(node.id.clone(), ctx.add_vertex(&node.label, deployment_style(node.kind), pos));
        }
    }

    for connection in &diagram.connections {
        let style = if connection.is_dashed {
            format!("{}dashed=1;", LINK_STYLE)
        } else {
            LINK_STYLE.to_string()
        };
        connect(
            ctx,
            &ids,
            &connection.from,
            &connection.to,
            label(&connection.label),
            &style,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawio::{GraphSummary, inspect};
    use crate::plantuml::parser::parse_plantuml;

    fn render(source: &str) -> GraphSummary {
        let mut ctx = GeneratorContext::with_prefix("t");
        render_cells(&mut ctx, &parse_plantuml(source));
        inspect(&ctx.finish(&ConvertOptions::default())).unwrap()
    }

    #[test]
    fn test_class_scenario_emits_two_vertices_and_one_edge() {
        let summary = render("@startuml\nclass A\nclass B\nA --> B\n@enduml");
        let vertices: Vec<_> = summary.vertices().collect();
        assert_eq!(vertices.len(), 2);
        let edges: Vec<_> = summary.edges().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source.as_deref(), Some(vertices[0].id.as_str()));
        assert_eq!(edges[0].target.as_deref(), Some(vertices[1].id.as_str()));
    }

    #[test]
    fn test_dangling_relations_are_dropped() {
        let summary = render("class A {\n+ id : int\n}\nA --> Ghost");
        assert_eq!(summary.vertices().count(), 1);
        assert_eq!(summary.edges().count(), 0);
    }

    #[test]
    fn test_class_labels_escape_markup() {
        let summary = render("class A {\n+ items : List<String>\n}");
        let value = summary.vertices().next().unwrap().value.clone().unwrap();
        assert!(value.contains("+ items: List&lt;String&gt;"));
    }

    #[test]
    fn test_activity_chain_and_decision() {
        let summary = render("start\n:Do X;\nstop");
        assert_eq!(summary.vertices().count(), 3);
        assert_eq!(summary.edges().count(), 2);
        assert!(summary.vertex_by_value("Do X").is_some());

        let summary = render("start\nif (A) then (yes)\n:Y;\nelse (B)\n:N;\nendif\nstop");
        let decision = summary.vertex_by_value("A").unwrap().id.clone();
        let yes = summary.vertex_by_value("Y").unwrap().id.clone();
        let no = summary.vertex_by_value("N").unwrap().id.clone();
        let out: Vec<_> = summary
            .edges()
            .filter(|e| e.source.as_deref() == Some(decision.as_str()))
            .map(|e| (e.target.clone().unwrap(), e.value.clone().unwrap()))
            .collect();
        assert_eq!(out, vec![(yes.clone(), "yes".to_string()), (no.clone(), "B".to_string())]);

        let merge_of = |id: &str| {
            summary
                .edges()
                .find(|e| e.source.as_deref() == Some(id))
                .and_then(|e| e.target.clone())
        };
        assert!(merge_of(&yes).is_some());
        assert_eq!(merge_of(&yes), merge_of(&no));
    }

    #[test]
    fn test_sequence_messages_connect_lifelines() {
        let summary = render("participant A\nparticipant B\nA -> B : ping\nB --> A : pong\nalt retry\nA -> B : again\nend");
        // 1 fragment + 2 lifelines
        assert_eq!(summary.vertices().count(), 3);
        let edges: Vec<_> = summary.edges().collect();
        assert_eq!(edges.len(), 3);
        let a = summary.vertex_by_value("A").unwrap().id.clone();
        assert_eq!(edges[0].source.as_deref(), Some(a.as_str()));
        assert_eq!(edges[1].target.as_deref(), Some(a.as_str()));
        assert_eq!(edges[1].value.as_deref(), Some("pong"));
    }

    #[test]
    fn test_state_usecase_mindmap_er_deployment_render() {
        let state = render("[*] --> Idle\nIdle --> [*]");
        assert_eq!(state.vertices().count(), 3);
        assert_eq!(state.edges().count(), 2);

        let usecase = render("actor User\nrectangle Shop {\nusecase (Buy) as B\n}\nUser --> B");
        assert_eq!(usecase.vertices().count(), 3);
        assert_eq!(usecase.edges().count(), 1);

        let mindmap = render("@startmindmap\n* Root\n** Child1\n** Child2\n@endmindmap");
        assert_eq!(mindmap.vertices().count(), 3);
        assert_eq!(mindmap.edges().count(), 2);

        let er = render("entity User {\n*id : int\n}\nentity Post\nUser ||--o{ Post : writes");
        assert_eq!(er.vertices().count(), 2);
        assert_eq!(er.edges().count(), 1);

        let deployment = render("node web\ndatabase db\nweb --> db : sql");
        assert_eq!(deployment.vertices().count(), 2);
        assert_eq!(deployment.edges().next().unwrap().value.as_deref(), Some("sql"));
    }
}
