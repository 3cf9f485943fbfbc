#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C4Kind {
    Person,
    PersonExt,
    System,
    SystemDb,
    SystemQueue,
    SystemExt,
    Container,
    ContainerDb,
    ContainerQueue,
    ContainerExt,
    Component,
    ComponentDb,
    ComponentExt,
    Boundary,
}

impl C4Kind {
    pub fn from_macro(name: &str) -> Option<Self> {
        let kind = match name {
            "Person" => C4Kind::Person,
            "Person_Ext" => C4Kind::PersonExt,
            "System" => C4Kind::System,
            "SystemDb" => C4Kind::SystemDb,
            "SystemQueue" => C4Kind::SystemQueue,
            "System_Ext" => C4Kind::SystemExt,
            "Container" => C4Kind::Container,
            "ContainerDb" => C4Kind::ContainerDb,
            "ContainerQueue" => C4Kind::ContainerQueue,
            "Container_Ext" => C4Kind::ContainerExt,
            "Component" => C4Kind::Component,
            "ComponentDb" => C4Kind::ComponentDb,
            "Component_Ext" => C4Kind::ComponentExt,
            "Boundary" | "System_Boundary" | "Container_Boundary" | "Enterprise_Boundary" => {
                C4Kind::Boundary
            }
            _ => return None,
        };
        Some(kind)
    }

    /// Whether the third positional argument is a technology rather than a
    /// description.
    pub fn has_technology(&self) -> bool {
        matches!(
            self,
            C4Kind::Container
                | C4Kind::ContainerDb
                | C4Kind::ContainerQueue
                | C4Kind::ContainerExt
                | C4Kind::Component
                | C4Kind::ComponentDb
                | C4Kind::ComponentExt
        )
    }

    pub fn is_external(&self) -> bool {
        matches!(
            self,
            C4Kind::PersonExt | C4Kind::SystemExt | C4Kind::ContainerExt | C4Kind::ComponentExt
        )
    }

    /// Caption shown under the label, e.g. `[Container: Rust]`.
    pub fn caption(&self) -> &'static str {
        match self {
            C4Kind::Person | C4Kind::PersonExt => "Person",
            C4Kind::System | C4Kind::SystemDb | C4Kind::SystemQueue | C4Kind::SystemExt => {
                "Software System"
            }
            C4Kind::Container
            | C4Kind::ContainerDb
            | C4Kind::ContainerQueue
            | C4Kind::ContainerExt => "Container",
            C4Kind::Component | C4Kind::ComponentDb | C4Kind::ComponentExt => "Component",
            C4Kind::Boundary => "Boundary",
        }
    }
}

/// A declared element. `children` holds the elements declared inside its
/// braces.
#[derive(Debug, Clone)]
pub struct C4Entity {
    pub alias: String,
    pub label: String,
    pub kind: C4Kind,
    pub technology: Option<String>,
    pub description: Option<String>,
    pub children: Vec<C4Entity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct C4Relation {
    pub source: String,
    pub target: String,
    pub label: String,
    pub description: String,
    pub bidirectional: bool,
}

#[derive(Debug, Clone, Default)]
pub struct C4Diagram {
    /// Root entities; nested ones live in their parent's `children`.
    pub entities: Vec<C4Entity>,
    pub relations: Vec<C4Relation>,
}

impl C4Diagram {
    /// Depth-first walk yielding each entity with its nesting depth.
    pub fn flatten(&self) -> Vec<(usize, &C4Entity)> {
        fn walk<'a>(entity: &'a C4Entity, depth: usize, out: &mut Vec<(usize, &'a C4Entity)>) {
            out.push((depth, entity));
            for child in &entity.children {
                walk(child, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        for entity in &self.entities {
            walk(entity, 0, &mut out);
        }
        out
    }
}
