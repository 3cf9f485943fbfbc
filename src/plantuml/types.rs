// ============================================
// Class Diagram Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
    Abstract,
    Enum,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Package,
}

impl Visibility {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '+' => Some(Visibility::Public),
            '-' => Some(Visibility::Private),
            '#' => Some(Visibility::Protected),
            '~' => Some(Visibility::Package),
            _ => None,
        }
    }

    pub fn marker(&self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Private => '-',
            Visibility::Protected => '#',
            Visibility::Package => '~',
        }
    }
}

/// An attribute or method line of a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub visibility: Option<Visibility>,
    pub name: String,
    pub type_name: Option<String>,
    pub is_method: bool,
}

#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: String,
    pub kind: ClassKind,
    pub attributes: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Extends,
    Implements,
    Composition,
    Aggregation,
    Association,
    Dependency,
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub kind: RelationKind,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassDiagram {
    pub classes: Vec<ClassDef>,
    pub relations: Vec<Relation>,
}

// ============================================
// Sequence Diagram Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Participant,
    Actor,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub label: String,
    pub kind: ParticipantKind,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    pub is_return: bool,
    pub is_async: bool,
    pub is_dashed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// `== Title ==` divider.
    Separator,
    /// `alt`, `opt`, `loop`, ... fragment.
    Fragment,
    /// `else` branch inside a fragment.
    Branch,
}

/// A group marker. `start_index` points into the message list.
#[derive(Debug, Clone)]
pub struct Group {
    pub label: String,
    pub kind: GroupKind,
    pub start_index: usize,
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct SequenceDiagram {
    pub participants: Vec<Participant>,
    pub messages: Vec<Message>,
    pub groups: Vec<Group>,
}

// ============================================
// Activity Diagram Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Start,
    End,
    Action,
    Decision,
    Merge,
    Fork,
    ElseIfMarker,
    ElseMarker,
}

impl ActivityKind {
    pub fn is_marker(&self) -> bool {
        matches!(self, ActivityKind::ElseIfMarker | ActivityKind::ElseMarker)
    }
}

#[derive(Debug, Clone)]
pub struct Activity {
    pub id: usize,
    pub kind: ActivityKind,
    pub label: String,
    /// Branch label: the `then (...)` text of a decision, or the
    /// parenthesised text of an `else`/`elseif` marker.
    pub branch_label: Option<String>,
    pub swimlane: Option<usize>,
    pub partition: Option<usize>,
    pub related_decision: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Swimlane {
    pub id: usize,
    pub label: String,
    pub color: Option<String>,
    pub start_index: usize,
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Partition {
    pub id: usize,
    pub label: String,
    pub color: Option<String>,
    pub start_index: usize,
    pub end_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityEdge {
    pub from: usize,
    pub to: usize,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityDiagram {
    pub activities: Vec<Activity>,
    pub edges: Vec<ActivityEdge>,
    pub swimlanes: Vec<Swimlane>,
    pub partitions: Vec<Partition>,
}

// ============================================
// State Diagram Types
// ============================================

pub const START_STATE_ID: &str = "[*]_start";
pub const END_STATE_ID: &str = "[*]_end";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    State,
    Start,
    End,
}

#[derive(Debug, Clone)]
pub struct State {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: StateKind,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StateDiagram {
    pub states: Vec<State>,
    pub transitions: Vec<Transition>,
}

// ============================================
// Usecase Diagram Types
// ============================================

#[derive(Debug, Clone)]
pub struct Actor {
    pub name: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct Usecase {
    pub name: String,
    pub label: String,
    /// Index into `UsecaseDiagram::rectangles`.
    pub rectangle: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Rectangle {
    pub label: String,
    pub usecases: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UsecaseLink {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub is_dashed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UsecaseDiagram {
    pub actors: Vec<Actor>,
    pub usecases: Vec<Usecase>,
    pub rectangles: Vec<Rectangle>,
    pub links: Vec<UsecaseLink>,
}

// ============================================
// Mindmap Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct MindmapNode {
    pub id: usize,
    pub text: String,
    pub level: usize,
    pub side: Side,
    pub parent: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct MindmapDiagram {
    pub nodes: Vec<MindmapNode>,
}

// ============================================
// ER Diagram Types
// ============================================

#[derive(Debug, Clone)]
pub struct ErAttribute {
    pub name: String,
    pub type_name: Option<String>,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone)]
pub struct ErEntity {
    pub id: String,
    pub name: String,
    pub label: String,
    pub attributes: Vec<ErAttribute>,
}

#[derive(Debug, Clone)]
pub struct ErRelationship {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    /// Cardinalities at the `from` and `to` ends, e.g. `("1", "0..*")`.
    pub cardinalities: (String, String),
}

#[derive(Debug, Clone, Default)]
pub struct ErDiagram {
    pub entities: Vec<ErEntity>,
    pub relationships: Vec<ErRelationship>,
}

// ============================================
// Deployment Diagram Types
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentKind {
    Node,
    Database,
    Cloud,
    Artifact,
    Component,
    Folder,
    Frame,
    Storage,
    Queue,
    File,
    Package,
    Rectangle,
    Card,
    Agent,
    Stack,
    Actor,
}

impl DeploymentKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "node" => DeploymentKind::Node,
            "database" => DeploymentKind::Database,
            "cloud" => DeploymentKind::Cloud,
            "artifact" => DeploymentKind::Artifact,
            "component" => DeploymentKind::Component,
            "folder" => DeploymentKind::Folder,
            "frame" => DeploymentKind::Frame,
            "storage" => DeploymentKind::Storage,
            "queue" => DeploymentKind::Queue,
            "file" => DeploymentKind::File,
            "package" => DeploymentKind::Package,
            "rectangle" => DeploymentKind::Rectangle,
            "card" => DeploymentKind::Card,
            "agent" => DeploymentKind::Agent,
            "stack" => DeploymentKind::Stack,
            "actor" => DeploymentKind::Actor,
            _ => return None,
        };
        Some(kind)
    }
}

#[derive(Debug, Clone)]
pub struct DeploymentNode {
    pub id: String,
    pub name: String,
    pub label: String,
    pub kind: DeploymentKind,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub is_dashed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeploymentDiagram {
    pub nodes: Vec<DeploymentNode>,
    pub connections: Vec<Connection>,
}
