pub mod manifest;
pub mod registry;

pub use manifest::{Chemical, ChemicalClass, ChemicalManifest, PhysicalState};
pub use registry::ChemicalCatalog;
