use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use crate::error::{ConflictingDeclarationError, ExtractError};
use crate::stream::{Declaration, NarrowEval, PortDirection, Range, Statement, StorageKind};
use crate::utils::is_name_valid;

/// Width and signedness of a single declared bit-vector signal
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalDeclaration {
	/// Base name of the signal
	pub name: String,

	/// Bit width (always at least 1)
	pub width: u32,

	pub signed: bool,

	/// Storage keyword. Does not affect direction nor width inference.
	pub storage: StorageKind,

	/// Direction if the signal is a port of the enclosing module
	pub port: Option<PortDirection>,

	/// Position of the declaring statement in the stream
	pub position: usize,
}

/// Read-only snapshot of all bit-vector declarations of the enclosing scope
#[derive(Clone, Debug, Default)]
pub struct DeclarationCatalog {
	entries: HashMap<String, SignalDeclaration>,
	arrays: HashSet<String>,
	unresolved: Vec<String>,
}

/// Evaluates `[msb:lsb]` into a bit count
fn packed_width(range: &Range) -> Option<u32> {
	let msb = range.msb.narrow_eval().ok()?;
	let lsb = range.lsb.narrow_eval().ok()?;
	let width = msb.abs_diff(lsb).checked_add(1)?;
	u32::try_from(width).ok()
}

impl DeclarationCatalog {
	/// Catalogues every declaration in the stream, regardless of region markers
	pub fn build(stream: &[Statement]) -> Result<Self, ExtractError> {
		let mut catalog = Self::default();
		for (position, stmt) in stream.iter().enumerate() {
			if let Statement::Declaration(decl) = stmt {
				catalog.add_declaration(position, decl)?;
			}
		}

		debug!(
			"Catalogued {} declarations ({} arrays, {} unresolved)",
			catalog.entries.len(),
			catalog.arrays.len(),
			catalog.unresolved.len()
		);
		Ok(catalog)
	}

	fn add_declaration(&mut self, position: usize, decl: &Declaration) -> Result<(), ExtractError> {
		let width = match &decl.packed {
			None => Some(1),
			Some(range) => packed_width(range),
		};

		for declared in &decl.names {
			if !is_name_valid(&declared.name) {
				return Err(ExtractError::InvalidName(declared.name.clone()));
			}

			if declared.is_array() {
				debug!("Excluding array '{}' from the catalog", declared.name);
				self.arrays.insert(declared.name.clone());
				continue;
			}

			let Some(width) = width
			else {
				warn!("Width of '{}' is not a constant expression", declared.name);
				if !self.unresolved.contains(&declared.name) {
					self.unresolved.push(declared.name.clone());
				}
				continue;
			};

			let entry = SignalDeclaration {
				name: declared.name.clone(),
				width,
				signed: decl.signed,
				storage: decl.storage,
				port: decl.direction,
				position,
			};
			self.insert(entry)?;
		}

		Ok(())
	}

	fn insert(&mut self, entry: SignalDeclaration) -> Result<(), ExtractError> {
		if let Some(first) = self.entries.get_mut(&entry.name) {
			if first.width != entry.width || first.signed != entry.signed {
				return Err(ConflictingDeclarationError {
					name: entry.name,
					first_position: first.position,
					first_width: first.width,
					first_signed: first.signed,
					second_position: entry.position,
					second_width: entry.width,
					second_signed: entry.signed,
				}
				.into());
			}

			// Repeated declaration, e.g. a non-ANSI port followed by its net type
			debug!("Signal '{}' re-declared with identical width", entry.name);
			if first.port.is_none() {
				first.port = entry.port;
			}
			return Ok(());
		}

		self.entries.insert(entry.name.clone(), entry);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&SignalDeclaration> {
		self.entries.get(name)
	}

	/// Checks whether the name was declared with an unpacked dimension
	pub fn is_array(&self, name: &str) -> bool {
		self.arrays.contains(name)
	}

	/// Names whose declared width could not be evaluated
	pub fn unresolved(&self) -> &[String] {
		&self.unresolved
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
