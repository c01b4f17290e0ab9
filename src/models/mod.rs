pub mod portfolio;

pub use portfolio::{FileKind, ServiceCategory};
