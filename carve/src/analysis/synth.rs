use std::collections::HashSet;
use std::fmt::Display;

use log::debug;
use serde::Serialize;

use crate::stream::{Declaration, Expression, PortDirection, Statement, StorageKind};

use super::catalog::DeclarationCatalog;
use super::region::{RegionBoundary, RegionStatementKind};
use super::resolve::{Resolution, ResolvedSignal};

fn fmt_packed(f: &mut std::fmt::Formatter<'_>, signed: bool, width: u32) -> std::fmt::Result {
	if signed {
		write!(f, " signed")?;
	}
	if width > 1 {
		write!(f, " [{}:0]", width - 1)?;
	}
	Ok(())
}

/// Port of the extracted module
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PortSpec {
	pub name: String,
	pub direction: PortDirection,
	pub width: u32,
	pub signed: bool,
}

impl Display for PortSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} logic", self.direction.keyword())?;
		fmt_packed(f, self.signed, self.width)?;
		write!(f, " {}", self.name)
	}
}

/// Internal signal which needs a declaration in the extracted module
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocalWire {
	pub name: String,
	pub width: u32,
	pub signed: bool,
	pub storage: StorageKind,
}

impl Display for LocalWire {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.storage.keyword())?;
		fmt_packed(f, self.signed, self.width)?;
		write!(f, " {};", self.name)
	}
}

/// Result of an extraction: the new module boundary and its body
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExtractedModule {
	pub name: String,

	/// Ports in order of their first reference inside the region
	pub ports: Vec<PortSpec>,

	pub wires: Vec<LocalWire>,

	/// Region statements with markers dropped and port declarations removed
	pub body: Vec<Statement>,
}

impl ExtractedModule {
	pub fn inputs(&self) -> impl Iterator<Item = &PortSpec> {
		self.ports.iter().filter(|p| p.direction == PortDirection::Input)
	}

	pub fn outputs(&self) -> impl Iterator<Item = &PortSpec> {
		self.ports.iter().filter(|p| p.direction == PortDirection::Output)
	}

	pub fn port(&self, name: &str) -> Option<&PortSpec> {
		self.ports.iter().find(|p| p.name == name)
	}

	pub fn wire(&self, name: &str) -> Option<&LocalWire> {
		self.wires.iter().find(|w| w.name == name)
	}
}

/// Names declared by statements inside the region
fn region_declared_names<'a>(stream: &'a [Statement], region: &RegionBoundary) -> HashSet<&'a str> {
	region
		.statements(stream)
		.iter()
		.filter_map(|stmt| match stmt.kind {
			RegionStatementKind::Declaration(decl) => Some(decl),
			_ => None,
		})
		.flat_map(|decl| decl.names.iter().map(|n| n.name.as_str()))
		.collect()
}

/// Strips port names from a region declaration.
/// Initializers of removed names become continuous assignments.
fn rewrite_declaration(decl: &Declaration, ports: &HashSet<&str>, body: &mut Vec<Statement>) {
	let mut kept = decl.clone();
	kept.names.retain(|n| !ports.contains(n.name.as_str()));

	if !kept.names.is_empty() {
		body.push(kept.into());
	}

	for removed in decl.names.iter().filter(|n| ports.contains(n.name.as_str())) {
		debug!("Declaration of '{}' replaced by a port", removed.name);
		if let Some(init) = &removed.init {
			body.push(Statement::assign(Expression::signal(&removed.name), init.clone()));
		}
	}
}

/// Builds the extracted module from resolved signals
pub fn synthesize(
	name: &str,
	resolved: &[ResolvedSignal<'_>],
	catalog: &DeclarationCatalog,
	stream: &[Statement],
	region: &RegionBoundary,
) -> ExtractedModule {
	let mut ports = Vec::new();
	let mut wires = Vec::new();
	let declared_inside = region_declared_names(stream, region);

	for r in resolved {
		let signal = r.signal;
		match r.resolution {
			Resolution::InputPort | Resolution::OutputPort => {
				let direction = match r.resolution {
					Resolution::InputPort => PortDirection::Input,
					_ => PortDirection::Output,
				};
				ports.push(PortSpec {
					name: signal.name.clone(),
					direction,
					width: signal.width,
					signed: signal.signed,
				});
			},
			Resolution::InternalWire if !declared_inside.contains(signal.name.as_str()) => {
				let storage = catalog.get(&signal.name).map_or(StorageKind::Logic, |d| d.storage);
				wires.push(LocalWire {
					name: signal.name.clone(),
					width: signal.width,
					signed: signal.signed,
					storage,
				});
			},
			Resolution::InternalWire | Resolution::Unused => {},
		}
	}

	let port_names: HashSet<&str> = ports.iter().map(|p| p.name.as_str()).collect();
	let mut body = Vec::new();
	for position in region.begin + 1..region.end {
		match &stream[position] {
			Statement::Marker { .. } => {},
			Statement::Declaration(decl) => rewrite_declaration(decl, &port_names, &mut body),
			other => body.push(other.clone()),
		}
	}

	ExtractedModule {
		name: name.into(),
		ports,
		wires,
		body,
	}
}
