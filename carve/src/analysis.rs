mod catalog;
mod classify;
mod coverage;
mod external;
mod region;
mod resolve;
mod synth;
mod unify;

pub use catalog::{DeclarationCatalog, SignalDeclaration};
pub use classify::{classify, AccessForm, Membership, PortShape, SignalReference, SignalRole};
pub use coverage::CoverageMask;
pub use external::scan_outside;
pub use region::{InlineZone, RegionBoundary, RegionStatement, RegionStatementKind};
pub use resolve::{resolve, resolve_all, Resolution, ResolvedSignal};
pub use synth::{synthesize, ExtractedModule, LocalWire, PortSpec};
pub use unify::{unify, SignalTable, UnifiedSignal, WidthSource};

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ExtractError;
use crate::report::{ExtractMessageKind, ExtractReport};
use crate::stream::{InterfaceProvider, Statement};
use crate::utils::is_name_valid;

pub const DEFAULT_MODULE_NAME: &str = "extracted_mod";

fn default_module_name() -> String {
	DEFAULT_MODULE_NAME.into()
}

/// Settings of a single extraction run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractOptions {
	/// Name of the generated module
	#[serde(default = "default_module_name")]
	pub module_name: String,
}

impl Default for ExtractOptions {
	fn default() -> Self {
		Self {
			module_name: default_module_name(),
		}
	}
}

/// Successful extraction result
#[derive(Clone, Debug, Serialize)]
pub struct Extraction {
	pub module: ExtractedModule,
	pub report: ExtractReport,
}

/// Runs all analysis stages over one statement stream
pub struct Extractor<'a, P: InterfaceProvider + ?Sized> {
	stream: &'a [Statement],
	interfaces: &'a P,
	options: ExtractOptions,
}

impl<'a, P: InterfaceProvider + ?Sized> Extractor<'a, P> {
	pub fn new(stream: &'a [Statement], interfaces: &'a P) -> Self {
		Self {
			stream,
			interfaces,
			options: ExtractOptions::default(),
		}
	}

	pub fn with_options(mut self, options: ExtractOptions) -> Self {
		self.options = options;
		self
	}

	pub fn run(&self) -> Result<Extraction, ExtractError> {
		if !is_name_valid(&self.options.module_name) {
			return Err(ExtractError::InvalidName(self.options.module_name.clone()));
		}

		let mut report = ExtractReport::default();

		info!("Running declaration catalog pass...");
		let catalog = DeclarationCatalog::build(self.stream)?;
		for name in catalog.unresolved() {
			report.add(ExtractMessageKind::UnresolvedDeclarationWidth { signal: name.clone() });
		}

		info!("Locating extract region...");
		let region = RegionBoundary::locate(self.stream)?;
		let statements = region.statements(self.stream);
		info!(
			"Region spans statements {}..{} ({} statements)",
			region.begin,
			region.end,
			statements.len()
		);

		info!("Running statement classification pass...");
		let references = classify(&statements, self.interfaces)?;
		info!("Classified {} signal references", references.len());

		info!("Running partial assignment unification pass...");
		let table = unify(references, &catalog, &mut report);

		info!("Running external usage pass...");
		let table = scan_outside(self.stream, &region, self.interfaces, table);

		info!("Resolving directions of {} signals", table.len());
		let resolved = resolve_all(&table);

		let module = synthesize(&self.options.module_name, &resolved, &catalog, self.stream, &region);
		info!(
			"Module '{}' synthesized with {} port(s) and {} local wire(s)",
			module.name,
			module.ports.len(),
			module.wires.len()
		);

		Ok(Extraction { module, report })
	}
}

/// Extracts the marked region with default options
pub fn extract<P: InterfaceProvider + ?Sized>(stream: &[Statement], interfaces: &P) -> Result<Extraction, ExtractError> {
	Extractor::new(stream, interfaces).run()
}
