pub mod analysis;
pub mod error;
pub mod report;
pub mod stream;
mod utils;

pub use analysis::{extract, ExtractOptions, ExtractedModule, Extraction, Extractor, PortSpec};
pub use error::ExtractError;
pub use report::{ExtractMessage, ExtractMessageKind, ExtractMessageSeverity, ExtractReport};
pub use stream::{InterfaceLibrary, InterfaceProvider, ModuleInterface, Statement};
