use log::debug;

use crate::stream::{Expression, ExprUse, InterfaceProvider, PortDirection, Statement};

use super::classify::{AccessForm, Membership, SignalReference, SignalRole};
use super::region::RegionBoundary;
use super::unify::SignalTable;

/// Collects references from statements outside the region.
/// Never fails, anything it cannot interpret is still a reference.
struct OutsideScanner {
	table: SignalTable,
	marked: usize,
}

impl OutsideScanner {
	fn add_expression(&mut self, expr: &Expression, role: SignalRole, position: usize) {
		for access in expr.accesses() {
			self.add_reference(&access.name, AccessForm::evaluate_lenient(access), role, position);
		}
	}

	fn add_reference(&mut self, name: &str, access: AccessForm, role: SignalRole, position: usize) {
		let reference = SignalReference {
			name: name.into(),
			access,
			role,
			membership: Membership::Outside,
			position,
			formal: None,
		};

		if self.table.add_outside_reference(reference) {
			self.marked += 1;
		}
	}

	fn add_statement<P: InterfaceProvider + ?Sized>(&mut self, stmt: &Statement, position: usize, interfaces: &P) {
		match stmt {
			Statement::Marker { .. } => {},
			Statement::Declaration(decl) => {
				for declared in &decl.names {
					// Ports are driven or read by the enclosing module's boundary
					match decl.direction {
						Some(PortDirection::Input) => {
							self.add_reference(&declared.name, AccessForm::Whole, SignalRole::AssignmentTarget, position)
						},
						Some(PortDirection::Output) => {
							self.add_reference(&declared.name, AccessForm::Whole, SignalRole::AssignmentSource, position)
						},
						Some(PortDirection::Inout) => {
							self.add_reference(&declared.name, AccessForm::Whole, SignalRole::AssignmentTarget, position);
							self.add_reference(&declared.name, AccessForm::Whole, SignalRole::AssignmentSource, position);
						},
						None => {},
					}

					if let Some(init) = &declared.init {
						self.add_expression(init, SignalRole::AssignmentSource, position);
					}
				}
			},
			Statement::Assign(assign) => {
				self.add_expression(&assign.lhs, SignalRole::AssignmentTarget, position);
				self.add_expression(&assign.rhs, SignalRole::AssignmentSource, position);
			},
			Statement::Instance(instance) => {
				let interface = interfaces.interface(&instance.module);
				for conn in &instance.connections {
					let Some(expr) = &conn.expr
					else {
						continue;
					};

					let direction = interface
						.and_then(|i| i.get_port(&conn.port))
						.map(|p| p.direction)
						.unwrap_or(PortDirection::Input);

					match direction {
						PortDirection::Input => self.add_expression(expr, SignalRole::InstanceInput, position),
						PortDirection::Output => self.add_expression(expr, SignalRole::InstanceOutput, position),
						PortDirection::Inout => {
							self.add_expression(expr, SignalRole::InstanceOutput, position);
							self.add_expression(expr, SignalRole::InstanceInput, position);
						},
					}
				}
			},
			Statement::Process(process) => {
				let mut exprs = Vec::new();
				process.walk(&mut |expr, usage| exprs.push((expr, usage)));
				for (expr, usage) in exprs {
					let role = match usage {
						ExprUse::Target => SignalRole::AssignmentTarget,
						ExprUse::Read => SignalRole::AssignmentSource,
					};
					self.add_expression(expr, role, position);
				}
			},
		}
	}
}

/// Marks every signal of the table that is referenced by a statement outside the region
pub fn scan_outside<P: InterfaceProvider + ?Sized>(
	stream: &[Statement],
	region: &RegionBoundary,
	interfaces: &P,
	table: SignalTable,
) -> SignalTable {
	let mut scanner = OutsideScanner { table, marked: 0 };
	for position in region.outside_positions(stream.len()) {
		scanner.add_statement(&stream[position], position, interfaces);
	}

	debug!("Found {} outside reference(s) to region signals", scanner.marked);
	scanner.table
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::analysis::catalog::DeclarationCatalog;
	use crate::analysis::classify::classify;
	use crate::analysis::unify::unify;
	use crate::report::ExtractReport;
	use crate::stream::{Declaration, Instance, InterfaceLibrary, Marker, ModuleInterface};
	use crate::ExtractError;

	fn scan(stream: &[Statement], interfaces: &InterfaceLibrary) -> Result<SignalTable, ExtractError> {
		let region = RegionBoundary::locate(stream)?;
		let catalog = DeclarationCatalog::build(stream)?;
		let refs = classify(&region.statements(stream), interfaces)?;
		let table = unify(refs, &catalog, &mut ExtractReport::default());
		Ok(scan_outside(stream, &region, interfaces, table))
	}

	fn outside(table: &SignalTable, name: &str) -> bool {
		table.get(name).unwrap().referenced_outside
	}

	#[test]
	fn before_and_after_both_count() -> Result<(), ExtractError> {
		let stream = vec![
			Statement::assign(Expression::signal("a"), Expression::signal("x")),
			Statement::marker(Marker::ExtractBegin),
			Statement::assign(Expression::signal("a"), Expression::signal("b") | Expression::signal("c")),
			Statement::marker(Marker::ExtractEnd),
			Statement::assign(Expression::signal("y"), Expression::bit("c", 0)),
		];

		let table = scan(&stream, &InterfaceLibrary::new())?;
		assert!(outside(&table, "a"));
		assert!(!outside(&table, "b"));
		assert!(outside(&table, "c"));
		assert!(!table.contains("x") && !table.contains("y"));
		Ok(())
	}

	#[test]
	fn declared_names_are_not_references() -> Result<(), ExtractError> {
		let stream = vec![
			Declaration::logic().packed(3, 0).name("w").name("v").into(),
			Declaration::logic().port(PortDirection::Output).name("o").into(),
			Declaration::wire().init_name("i", Expression::signal("v")).into(),
			Statement::marker(Marker::ExtractBegin),
			Statement::assign(Expression::signal("w"), Expression::signal("v")),
			Statement::assign(Expression::signal("o"), Expression::signal("w")),
			Statement::marker(Marker::ExtractEnd),
		];

		let table = scan(&stream, &InterfaceLibrary::new())?;
		assert!(!outside(&table, "w"));
		assert!(outside(&table, "v"));
		assert!(outside(&table, "o"));
		Ok(())
	}

	#[test]
	fn unknown_outside_instances_do_not_fail() -> Result<(), ExtractError> {
		let lib = InterfaceLibrary::new().with(ModuleInterface::new("sink").input("D", 1));
		let stream = vec![
			Statement::marker(Marker::ExtractBegin),
			Statement::assign(Expression::signal("p"), Expression::signal("q")),
			Statement::marker(Marker::ExtractEnd),
			Instance::new("mystery", "u0").connect("X", Expression::signal("p")).into(),
			Instance::new("sink", "u1")
				.connect("D", Expression::signal("q"))
				.unconnected("E")
				.into(),
		];

		let table = scan(&stream, &lib)?;
		assert!(outside(&table, "p"));
		assert!(outside(&table, "q"));

		let roles: Vec<_> = table
			.get("p")
			.unwrap()
			.references
			.iter()
			.filter(|r| r.membership == Membership::Outside)
			.map(|r| r.role)
			.collect();
		assert_eq!(roles, vec![SignalRole::InstanceInput]);
		Ok(())
	}
}
