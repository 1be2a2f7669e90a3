use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::report::{ExtractMessageKind, ExtractReport};

use super::catalog::DeclarationCatalog;
use super::classify::{AccessForm, Membership, PortShape, SignalReference};
use super::coverage::CoverageMask;

/// Where the final width of a signal came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidthSource {
	/// Declaration in the enclosing scope
	Declaration,

	/// Highest bit index of a select inside the region
	SelectExtent,

	/// Formal port the signal is wholly connected to
	FormalPort,

	Default,
}

/// All references to a single base name merged into one logical signal
#[derive(Clone, Debug, Serialize)]
pub struct UnifiedSignal {
	pub name: String,
	pub produced_inside: bool,
	pub consumed_inside: bool,
	pub referenced_outside: bool,
	pub width: u32,
	pub signed: bool,
	pub width_source: WidthSource,

	/// Inside references first (in textual order), then outside ones
	#[serde(skip)]
	pub references: Vec<SignalReference>,
}

impl UnifiedSignal {
	/// Position of the first reference inside the region
	pub fn first_position(&self) -> Option<usize> {
		self.references
			.iter()
			.find(|r| r.membership == Membership::Inside)
			.map(|r| r.position)
	}
}

/// Unified signals in order of their first appearance inside the region
#[derive(Clone, Debug, Default)]
pub struct SignalTable {
	signals: Vec<UnifiedSignal>,
	index: HashMap<String, usize>,
}

impl SignalTable {
	fn push(&mut self, signal: UnifiedSignal) {
		self.index.insert(signal.name.clone(), self.signals.len());
		self.signals.push(signal);
	}

	pub fn get(&self, name: &str) -> Option<&UnifiedSignal> {
		self.index.get(name).map(|&i| &self.signals[i])
	}

	pub fn contains(&self, name: &str) -> bool {
		self.index.contains_key(name)
	}

	/// Records a reference found outside the region.
	/// Returns false if the name is never referenced inside the region.
	pub fn add_outside_reference(&mut self, reference: SignalReference) -> bool {
		let Some(&i) = self.index.get(&reference.name)
		else {
			return false;
		};

		let signal = &mut self.signals[i];
		if !signal.referenced_outside {
			debug!("'{}' is referenced outside at {}", signal.name, reference.position);
		}
		signal.referenced_outside = true;
		signal.references.push(reference);
		true
	}

	pub fn iter(&self) -> impl Iterator<Item = &UnifiedSignal> {
		self.signals.iter()
	}

	pub fn len(&self) -> usize {
		self.signals.len()
	}

	pub fn is_empty(&self) -> bool {
		self.signals.is_empty()
	}
}

/// Running state for a single base name
#[derive(Default)]
struct SignalAccumulator {
	references: Vec<SignalReference>,
	produced: bool,
	consumed: bool,
	produced_whole: bool,

	/// Bits driven through selects
	driven: CoverageMask,

	/// Highest bit index touched by any select
	max_extent: Option<u32>,

	/// First formal port the signal was wholly bound to
	formal: Option<PortShape>,
}

impl SignalAccumulator {
	fn add(&mut self, reference: SignalReference) {
		let production = reference.role.is_production();
		if production {
			self.produced = true;
		}
		else {
			self.consumed = true;
		}

		match reference.access.bits() {
			None if production => self.produced_whole = true,
			None => {},
			Some((lsb, msb)) => {
				if production && self.driven.cover_bits(lsb, msb) {
					debug!("Overlapping partial assignment to '{}[{}:{}]'", reference.name, msb, lsb);
				}
			},
		}

		if let Some(extent) = reference.access.extent() {
			self.max_extent = Some(self.max_extent.map_or(extent, |m| m.max(extent)));
		}

		if self.formal.is_none() && reference.access == AccessForm::Whole {
			self.formal = reference.formal;
		}

		self.references.push(reference);
	}

	fn finish(self, name: String, catalog: &DeclarationCatalog, report: &mut ExtractReport) -> UnifiedSignal {
		if catalog.is_array(&name) {
			report.add(ExtractMessageKind::ArrayDeclarationIgnored { signal: name.clone() });
		}

		let (width, signed, width_source) = if let Some(decl) = catalog.get(&name) {
			if let Some(extent) = self.max_extent.filter(|e| *e >= decl.width) {
				report.add(ExtractMessageKind::SelectExceedsDeclaredWidth {
					signal: name.clone(),
					declared_width: decl.width,
					extent,
				});
			}
			(decl.width, decl.signed, WidthSource::Declaration)
		}
		else if let Some(width) = self.max_extent.and_then(|extent| extent.checked_add(1)) {
			report.add(ExtractMessageKind::InferredWidth {
				signal: name.clone(),
				width,
			});

			if self.produced && !self.produced_whole {
				let uncovered = self.driven.gaps(width);
				if !uncovered.is_empty() {
					report.add(ExtractMessageKind::PartialCoverage {
						signal: name.clone(),
						uncovered,
					});
				}
			}
			(width, false, WidthSource::SelectExtent)
		}
		else if let Some(formal) = self.formal.filter(|formal| formal.width > 0) {
			report.add(ExtractMessageKind::InferredWidth {
				signal: name.clone(),
				width: formal.width,
			});
			(formal.width, formal.signed, WidthSource::FormalPort)
		}
		else {
			(1, false, WidthSource::Default)
		};

		debug!("Unified '{}' with width {} ({:?})", name, width, width_source);
		UnifiedSignal {
			name,
			produced_inside: self.produced,
			consumed_inside: self.consumed,
			referenced_outside: false,
			width,
			signed,
			width_source,
			references: self.references,
		}
	}
}

/// Groups inside references by base name and infers the width of each signal
pub fn unify(references: Vec<SignalReference>, catalog: &DeclarationCatalog, report: &mut ExtractReport) -> SignalTable {
	let mut order: Vec<String> = Vec::new();
	let mut accumulators: HashMap<String, SignalAccumulator> = HashMap::new();

	for reference in references {
		let acc = accumulators.entry(reference.name.clone()).or_insert_with(|| {
			order.push(reference.name.clone());
			SignalAccumulator::default()
		});
		acc.add(reference);
	}

	let mut table = SignalTable::default();
	for name in order {
		if let Some(acc) = accumulators.remove(&name) {
			table.push(acc.finish(name, catalog, report));
		}
	}

	table
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::analysis::classify::SignalRole;
	use crate::stream::{Declaration, Range, Statement};

	fn reference(name: &str, access: AccessForm, role: SignalRole) -> SignalReference {
		SignalReference {
			name: name.into(),
			access,
			role,
			membership: Membership::Inside,
			position: 0,
			formal: None,
		}
	}

	fn empty_catalog() -> DeclarationCatalog {
		DeclarationCatalog::default()
	}

	#[test]
	fn partial_assignments_merge() {
		let mut report = ExtractReport::default();
		let table = unify(
			vec![
				reference("ccc", AccessForm::Bit(0), SignalRole::AssignmentTarget),
				reference("ccc", AccessForm::Range { msb: 3, lsb: 1 }, SignalRole::AssignmentTarget),
				reference("ccc", AccessForm::Bit(2), SignalRole::AssignmentSource),
			],
			&empty_catalog(),
			&mut report,
		);

		assert_eq!(table.len(), 1);
		let ccc = table.get("ccc").unwrap();
		assert_eq!(ccc.width, 4);
		assert_eq!(ccc.width_source, WidthSource::SelectExtent);
		assert!(ccc.produced_inside && ccc.consumed_inside);
		assert_eq!(ccc.references.len(), 3);

		// Fully covered, so only the inferred width is reported
		assert_eq!(report.messages().len(), 1);
		assert!(!report.has_warnings());
	}

	#[test]
	fn gaps_do_not_shrink_width() {
		let mut report = ExtractReport::default();
		let table = unify(
			vec![
				reference("x", AccessForm::Bit(0), SignalRole::AssignmentTarget),
				reference("x", AccessForm::Range { msb: 7, lsb: 6 }, SignalRole::AssignmentTarget),
			],
			&empty_catalog(),
			&mut report,
		);

		assert_eq!(table.get("x").unwrap().width, 8);
		assert!(report.messages().iter().any(|m| m.kind()
			== &ExtractMessageKind::PartialCoverage {
				signal: "x".into(),
				uncovered: vec![(1, 5)],
			}));
	}

	#[test]
	fn declaration_wins_over_selects() -> Result<(), crate::ExtractError> {
		let catalog = DeclarationCatalog::build(&[Statement::from(
			Declaration::logic().signed().packed(3, 0).name("bus_in_hi"),
		)])?;

		let mut report = ExtractReport::default();
		let table = unify(
			vec![
				reference("bus_in_hi", AccessForm::Bit(1), SignalRole::AssignmentSource),
				reference("bus_in_hi", AccessForm::Bit(5), SignalRole::AssignmentSource),
			],
			&catalog,
			&mut report,
		);

		let sig = table.get("bus_in_hi").unwrap();
		assert_eq!(sig.width, 4);
		assert!(sig.signed);
		assert_eq!(sig.width_source, WidthSource::Declaration);
		assert!(report.has_warnings());
		Ok(())
	}

	#[test]
	fn formal_port_width_fallback() {
		let mut bound = reference("p", AccessForm::Whole, SignalRole::InstanceInput);
		bound.formal = Some(PortShape { width: 16, signed: true });

		let mut report = ExtractReport::default();
		let table = unify(
			vec![bound, reference("q", AccessForm::Whole, SignalRole::AssignmentSource)],
			&empty_catalog(),
			&mut report,
		);

		let p = table.get("p").unwrap();
		assert_eq!((p.width, p.signed, p.width_source), (16, true, WidthSource::FormalPort));

		let q = table.get("q").unwrap();
		assert_eq!((q.width, q.width_source), (1, WidthSource::Default));
	}

	#[test]
	fn arrays_are_reported() -> Result<(), crate::ExtractError> {
		let catalog = DeclarationCatalog::build(&[Statement::from(
			Declaration::logic()
				.packed(7, 0)
				.array_name("arr", Range::constant(0, 3)),
		)])?;

		let mut report = ExtractReport::default();
		let table = unify(
			vec![reference("arr", AccessForm::Whole, SignalRole::AssignmentSource)],
			&catalog,
			&mut report,
		);

		assert_eq!(table.get("arr").unwrap().width_source, WidthSource::Default);
		assert_eq!(
			report.messages()[0].kind(),
			&ExtractMessageKind::ArrayDeclarationIgnored { signal: "arr".into() }
		);
		Ok(())
	}

	#[test]
	fn array_width_comes_from_selects() -> Result<(), crate::ExtractError> {
		let catalog = DeclarationCatalog::build(&[Statement::from(
			Declaration::logic()
				.packed(7, 0)
				.array_name("arr", Range::constant(0, 3)),
		)])?;

		let mut report = ExtractReport::default();
		let table = unify(
			vec![reference("arr", AccessForm::Bit(2), SignalRole::AssignmentSource)],
			&catalog,
			&mut report,
		);

		let arr = table.get("arr").unwrap();
		assert_eq!(arr.width, 3);
		assert_eq!(arr.width_source, WidthSource::SelectExtent);
		assert!(report
			.messages()
			.iter()
			.any(|m| m.kind() == &ExtractMessageKind::InferredWidth { signal: "arr".into(), width: 3 }));
		Ok(())
	}

	#[test]
	fn discovery_order_and_outside_references() {
		let mut report = ExtractReport::default();
		let mut table = unify(
			vec![
				reference("b", AccessForm::Whole, SignalRole::AssignmentTarget),
				reference("a", AccessForm::Whole, SignalRole::AssignmentSource),
				reference("b", AccessForm::Whole, SignalRole::AssignmentSource),
			],
			&empty_catalog(),
			&mut report,
		);

		let names: Vec<_> = table.iter().map(|s| s.name.as_str()).collect();
		assert_eq!(names, vec!["b", "a"]);

		let mut outside = reference("b", AccessForm::Whole, SignalRole::AssignmentSource);
		outside.membership = Membership::Outside;
		outside.position = 9;
		assert!(table.add_outside_reference(outside.clone()));

		outside.name = "zzz".into();
		assert!(!table.add_outside_reference(outside));

		let b = table.get("b").unwrap();
		assert!(b.referenced_outside);
		assert_eq!(b.first_position(), Some(0));
		assert!(!table.get("a").unwrap().referenced_outside);
	}

	#[test]
	fn zero_width_formal_is_ignored() {
		let mut report = ExtractReport::default();
		let mut bound = reference("q", AccessForm::Whole, SignalRole::InstanceOutput);
		bound.formal = Some(PortShape { width: 0, signed: true });
		let table = unify(vec![bound], &empty_catalog(), &mut report);

		let q = table.get("q").unwrap();
		assert_eq!(q.width, 1);
		assert!(!q.signed);
		assert_eq!(q.width_source, WidthSource::Default);
	}
}
