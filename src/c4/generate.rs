use std::collections::HashMap;

use log::{debug, trace};

use super::layout::layout_c4;
use super::types::*;
use crate::config::ConvertOptions;
use crate::drawio::GeneratorContext;

const PERSON_STYLE: &str = "shape=mxgraph.c4.person2;whiteSpace=wrap;html=0;labelPosition=center;verticalLabelPosition=middle;align=center;verticalAlign=top;spacingTop=90;fontColor=#ffffff;strokeColor=#0D5091;fillColor=#08427B;";
const BOX_STYLE: &str = "rounded=1;whiteSpace=wrap;arcSize=10;fontColor=#ffffff;";
const DB_STYLE: &str = "shape=cylinder3;whiteSpace=wrap;boundedLbl=1;size=15;fontColor=#ffffff;";
const QUEUE_STYLE: &str = "shape=cylinder3;direction=south;whiteSpace=wrap;boundedLbl=1;size=15;fontColor=#ffffff;";
const BOUNDARY_STYLE: &str = "rounded=1;dashed=1;dashPattern=8 4;fillColor=none;strokeColor=#666666;fontColor=#333333;align=left;verticalAlign=bottom;spacingLeft=8;arcSize=4;";
const REL_STYLE: &str = "endArrow=blockThin;endFill=1;endSize=14;dashed=1;dashPattern=8 4;strokeColor=#828282;fontColor=#404040;";

fn fill(kind: C4Kind) -> (&'static str, &'static str) {
    if kind.is_external() {
        return ("#999999", "#8A8A8A");
    }
    match kind {
        C4Kind::System | C4Kind::SystemDb | C4Kind::SystemQueue => ("#1168BD", "#0B4884"),
        C4Kind::Container | C4Kind::ContainerDb | C4Kind::ContainerQueue => ("#438DD5", "#3C7FC0"),
        _ => ("#85BBF0", "#78A8D8"),
    }
}

fn entity_style(kind: C4Kind) -> String {
    let shape = match kind {
        C4Kind::Person => return PERSON_STYLE.to_string(),
        C4Kind::PersonExt => {
            return PERSON_STYLE
                .replace("#08427B", "#999999")
                .replace("#0D5091", "#8A8A8A");
        }
        C4Kind::Boundary => return BOUNDARY_STYLE.to_string(),
        C4Kind::SystemDb | C4Kind::ContainerDb | C4Kind::ComponentDb => DB_STYLE,
        C4Kind::SystemQueue | C4Kind::ContainerQueue => QUEUE_STYLE,
        _ => BOX_STYLE,
    };
    let (fill, stroke) = fill(kind);
    let mut style = format!("{}fillColor={};strokeColor={};", shape, fill, stroke);
    if matches!(kind, C4Kind::Component | C4Kind::ComponentDb) {
        style = style.replace("fontColor=#ffffff;", "fontColor=#000000;");
    }
    style
}

/// Plain-text label: name, a `[Kind: tech]` caption, then the description.
pub fn entity_label(entity: &C4Entity) -> String {
    let mut label = entity.label.clone();
    if entity.kind == C4Kind::Boundary {
        return label;
    }
    match &entity.technology {
        Some(tech) => label.push_str(&format!("\n[{}: {}]", entity.kind.caption(), tech)),
        None => label.push_str(&format!("\n[{}]", entity.kind.caption())),
    }
    if let Some(description) = &entity.description {
        label.push_str("\n\n");
        label.push_str(description);
    }
    label
}

/// Emit the cells of an architecture diagram into `ctx`.
pub fn render_cells(ctx: &mut GeneratorContext, diagram: &C4Diagram) {
    let positions = layout_c4(diagram);
    // A repeated alias resolves to its deepest occurrence, the last one on ties.
    let mut ids: HashMap<&str, (usize, String)> = HashMap::new();

    for ((depth, entity), pos) in diagram.flatten().into_iter().zip(&positions) {
        let id = ctx.add_vertex(&entity_label(entity), &entity_style(entity.kind), pos);
        let shadowed = ids
            .get(entity.alias.as_str())
            .is_some_and(|(seen, _)| *seen > depth);
        if !shadowed {
            ids.insert(entity.alias.as_str(), (depth, id));
        }
    }

    for relation in &diagram.relations {
        let (Some((_, source)), Some((_, target))) = (
            ids.get(relation.source.as_str()),
            ids.get(relation.target.as_str()),
        ) else {
            debug!(source:% = relation.source, target:% = relation.target; "Dropping relation with unknown alias");
            continue;
        };
        let mut value = relation.label.clone();
        if !relation.description.is_empty() {
            value.push_str(&format!("\n[{}]", relation.description));
        }
        let style = if relation.bidirectional {
            format!("{}startArrow=blockThin;startFill=1;startSize=14;", REL_STYLE)
        } else {
            REL_STYLE.to_string()
        };
        ctx.add_edge(source, target, &value, &style);
    }
}

/// Render an architecture diagram into a complete `<mxfile>` document.
pub fn generate(diagram: &C4Diagram, options: &ConvertOptions) -> String {
    let mut ctx = GeneratorContext::new();
    render_cells(&mut ctx, diagram);
    trace!(cells = ctx.cell_count(); "Generated architecture cells");
    ctx.finish(options)
}
