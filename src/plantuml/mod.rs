//! The eight PlantUML dialects: line normalization, dialect detection,
//! parsing, layout and cell generation.

pub mod classify;
pub mod generate;
pub mod layout;
pub mod normalize;
pub mod parser;
pub mod types;

pub use classify::{Dialect, classify};
pub use generate::{generate, render_cells};
pub use normalize::{normalize, strip_comments};
pub use parser::{ParsedDiagram, parse, parse_plantuml};
