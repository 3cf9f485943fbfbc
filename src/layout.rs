//! Geometry shared by the dialect layouts and the C4 pipeline.

use std::collections::{HashMap, HashSet, VecDeque};

/// Bounding box for a group of laid out elements
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn with_padding(&self, padding: f32) -> Self {
        Self::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }
}

/// Layout position for a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPos {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl LayoutPos {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Rough label width at the default 12px font.
pub fn text_width(text: &str) -> f32 {
    let longest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    longest as f32 * 7.0
}

pub fn calculate_bbox<'a>(positions: impl IntoIterator<Item = &'a LayoutPos>) -> BBox {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut any = false;

    for pos in positions {
        any = true;
        min_x = min_x.min(pos.x);
        min_y = min_y.min(pos.y);
        max_x = max_x.max(pos.right());
        max_y = max_y.max(pos.bottom());
    }

    if !any {
        return BBox::default();
    }
    BBox::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Place nodes row by row in a square-ish grid, in input order.
pub fn layout_grid(
    nodes: &[(String, (f32, f32))],
    start_x: f32,
    start_y: f32,
    spacing_x: f32,
    spacing_y: f32,
) -> HashMap<String, LayoutPos> {
    let mut positions = HashMap::new();
    if nodes.is_empty() {
        return positions;
    }

    let cols = ((nodes.len() as f32).sqrt().ceil() as usize).max(1);
    let rows = nodes.len().div_ceil(cols);

    let mut col_widths = vec![0.0f32; cols];
    let mut row_heights = vec![0.0f32; rows];
    for (idx, (_, (w, h))) in nodes.iter().enumerate() {
        col_widths[idx % cols] = col_widths[idx % cols].max(*w);
        row_heights[idx / cols] = row_heights[idx / cols].max(*h);
    }

    for (idx, (id, (w, h))) in nodes.iter().enumerate() {
        let col = idx % cols;
        let row = idx / cols;
        let x = start_x + col_widths[..col].iter().sum::<f32>() + col as f32 * spacing_x;
        let y = start_y + row_heights[..row].iter().sum::<f32>() + row as f32 * spacing_y;
        positions.insert(id.clone(), LayoutPos::new(x, y, *w, *h));
    }

    positions
}

/// Assign each node a rank by breadth-first search from the nodes without
/// incoming edges. Nodes left unreached (cycles) start new ranks below.
pub fn assign_ranks(nodes: &[String], edges: &[(String, String)]) -> HashMap<String, usize> {
    let known: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    let mut outgoing: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();

    for (from, to) in edges {
        if !known.contains(from.as_str()) || !known.contains(to.as_str()) || from == to {
            continue;
        }
        outgoing.entry(from.as_str()).or_default().push(to.as_str());
        has_incoming.insert(to.as_str());
    }

    let mut ranks: HashMap<&str, usize> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    for node in nodes.iter().map(String::as_str) {
        if !has_incoming.contains(node) {
            ranks.insert(node, 0);
            queue.push_back(node);
        }
    }

    bfs(&outgoing, &mut ranks, &mut queue);

    for node in nodes.iter().map(String::as_str) {
        if !ranks.contains_key(node) {
            let rank = ranks.values().copied().max().map_or(0, |r| r + 1);
            ranks.insert(node, rank);
            queue.push_back(node);
            bfs(&outgoing, &mut ranks, &mut queue);
        }
    }

    ranks.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn bfs<'a>(
    outgoing: &HashMap<&'a str, Vec<&'a str>>,
    ranks: &mut HashMap<&'a str, usize>,
    queue: &mut VecDeque<&'a str>,
) {
    while let Some(node) = queue.pop_front() {
        let rank = ranks.get(node).copied().unwrap_or(0);
        for &next in outgoing.get(node).map(Vec::as_slice).unwrap_or_default() {
            if !ranks.contains_key(next) {
                ranks.insert(next, rank + 1);
                queue.push_back(next);
            }
        }
    }
}

/// Rows by rank, nodes within a row in input order, each row centred on
/// the widest one.
pub fn layout_ranked(
    nodes: &[(String, (f32, f32))],
    edges: &[(String, String)],
    start_x: f32,
    start_y: f32,
    spacing_x: f32,
    spacing_y: f32,
) -> HashMap<String, LayoutPos> {
    let mut positions = HashMap::new();
    if nodes.is_empty() {
        return positions;
    }

    let ids: Vec<String> = nodes.iter().map(|(id, _)| id.clone()).collect();
    let ranks = assign_ranks(&ids, edges);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    let mut rows: Vec<Vec<&(String, (f32, f32))>> = vec![Vec::new(); max_rank + 1];
    for node in nodes {
        let rank = ranks.get(&node.0).copied().unwrap_or(0);
        rows[rank].push(node);
    }

    let row_width = |row: &[&(String, (f32, f32))]| {
        row.iter().map(|(_, (w, _))| *w).sum::<f32>()
            + spacing_x * row.len().saturating_sub(1) as f32
    };
    let widest = rows.iter().map(|r| row_width(r.as_slice())).fold(0.0, f32::max);

    let mut y = start_y;
    for row in &rows {
        let mut x = start_x + (widest - row_width(row.as_slice())) / 2.0;
        let height = row.iter().map(|(_, (_, h))| *h).fold(0.0, f32::max);
        for (id, (w, h)) in row {
            positions.insert(
                id.clone(),
                LayoutPos::new(x, y + (height - h) / 2.0, *w, *h),
            );
            x += w + spacing_x;
        }
        y += height + spacing_y;
    }

    positions
}
