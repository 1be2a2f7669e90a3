use log::debug;
use serde::Serialize;

use crate::error::{ExtractError, MalformedSelectError, SelectProblem, UnresolvedInstanceInterfaceError};
use crate::stream::{
	Expression, ExprUse, FormalPort, Instance, InterfaceProvider, NarrowEval, PortDirection, Select, SignalAccess,
};
use crate::utils::is_name_valid;

use super::region::{RegionStatement, RegionStatementKind};

/// Highest bit index a select may name
pub const MAX_BIT_INDEX: u32 = (1 << 20) - 1;

/// Form of a signal access with evaluated bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessForm {
	Whole,
	Bit(u32),
	Range { msb: u32, lsb: u32 },
}

impl AccessForm {
	/// Highest accessed bit index, `None` for whole-signal access
	pub fn extent(&self) -> Option<u32> {
		match self {
			Self::Whole => None,
			Self::Bit(index) => Some(*index),
			Self::Range { msb, .. } => Some(*msb),
		}
	}

	/// Accessed bits as `(lsb, msb)`
	pub fn bits(&self) -> Option<(u32, u32)> {
		match self {
			Self::Whole => None,
			Self::Bit(index) => Some((*index, *index)),
			Self::Range { msb, lsb } => Some((*lsb, *msb)),
		}
	}

	/// Evaluates the select of an access. All bounds must be constant.
	pub fn evaluate(access: &SignalAccess, position: usize) -> Result<Self, ExtractError> {
		let malformed = |reason: SelectProblem| -> ExtractError {
			MalformedSelectError {
				position,
				signal: access.name.clone(),
				reason,
			}
			.into()
		};

		let bound = |expr: &Expression| -> Result<u32, ExtractError> {
			let value = expr.narrow_eval().map_err(|e| malformed(e.into()))?;
			if value < 0 {
				return Err(malformed(SelectProblem::NegativeBound(value)));
			}
			u32::try_from(value)
				.ok()
				.filter(|index| *index <= MAX_BIT_INDEX)
				.ok_or_else(|| malformed(SelectProblem::BoundTooLarge(value)))
		};

		match &access.select {
			Select::Whole => Ok(Self::Whole),
			Select::Bit(index) => Ok(Self::Bit(bound(index)?)),
			Select::Range(range) => {
				let msb = bound(&range.msb)?;
				let lsb = bound(&range.lsb)?;
				if msb < lsb {
					return Err(malformed(SelectProblem::ReversedRange {
						msb: msb as i64,
						lsb: lsb as i64,
					}));
				}
				Ok(Self::Range { msb, lsb })
			},
		}
	}

	/// Like `evaluate`, but falls back to whole-signal access instead of failing
	pub fn evaluate_lenient(access: &SignalAccess) -> Self {
		Self::evaluate(access, 0).unwrap_or(Self::Whole)
	}
}

/// How a reference produces or consumes the signal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalRole {
	AssignmentTarget,
	AssignmentSource,
	InstanceInput,
	InstanceOutput,
}

impl SignalRole {
	/// Checks whether the reference drives the signal
	pub fn is_production(&self) -> bool {
		matches!(self, Self::AssignmentTarget | Self::InstanceOutput)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
	Inside,
	Outside,
}

/// Width and signedness of a formal port a signal is wholly bound to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PortShape {
	pub width: u32,
	pub signed: bool,
}

impl From<&FormalPort> for PortShape {
	fn from(port: &FormalPort) -> Self {
		Self {
			width: port.width,
			signed: port.signed,
		}
	}
}

/// Single occurrence of a signal in the statement stream
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignalReference {
	pub name: String,
	pub access: AccessForm,
	pub role: SignalRole,
	pub membership: Membership,

	/// Position of the containing statement
	pub position: usize,

	/// Formal port the signal is wholly connected to (instances only)
	#[serde(skip_serializing_if = "Option::is_none")]
	pub formal: Option<PortShape>,
}

/// Emits inside-region references in textual order
struct StatementClassifier<'a, P: InterfaceProvider + ?Sized> {
	interfaces: &'a P,
	references: Vec<SignalReference>,
}

impl<'a, P: InterfaceProvider + ?Sized> StatementClassifier<'a, P> {
	fn add_expression(
		&mut self,
		expr: &Expression,
		role: SignalRole,
		position: usize,
		formal: Option<PortShape>,
	) -> Result<(), ExtractError> {
		let formal = formal.filter(|_| expr.as_whole_signal().is_some());
		for access in expr.accesses() {
			if !is_name_valid(&access.name) {
				return Err(ExtractError::InvalidName(access.name.clone()));
			}

			let form = AccessForm::evaluate(access, position)?;
			debug!("Reference to '{}' {:?} as {:?} at {}", access.name, form, role, position);
			self.references.push(SignalReference {
				name: access.name.clone(),
				access: form,
				role,
				membership: Membership::Inside,
				position,
				formal,
			});
		}
		Ok(())
	}

	fn add_instance(&mut self, instance: &Instance, position: usize) -> Result<(), ExtractError> {
		let unresolved = |port: Option<&str>| -> ExtractError {
			UnresolvedInstanceInterfaceError {
				position,
				module: instance.module.clone(),
				instance: instance.name.clone(),
				port: port.map(String::from),
			}
			.into()
		};

		let interface = self.interfaces.interface(&instance.module).ok_or_else(|| unresolved(None))?;

		for conn in &instance.connections {
			let formal = interface.get_port(&conn.port).ok_or_else(|| unresolved(Some(conn.port.as_str())))?;
			let Some(expr) = &conn.expr
			else {
				continue;
			};

			let shape = Some(PortShape::from(formal));
			match formal.direction {
				PortDirection::Input => self.add_expression(expr, SignalRole::InstanceInput, position, shape)?,
				PortDirection::Output => self.add_expression(expr, SignalRole::InstanceOutput, position, shape)?,
				PortDirection::Inout => {
					self.add_expression(expr, SignalRole::InstanceOutput, position, shape)?;
					self.add_expression(expr, SignalRole::InstanceInput, position, shape)?;
				},
			}
		}

		Ok(())
	}

	fn add_inline_instance(&mut self, instance: &Instance, position: usize) -> Result<(), ExtractError> {
		let interface = self.interfaces.interface(&instance.module);
		if interface.is_none() {
			debug!(
				"No interface for inlined module '{}', treating connections as reads",
				instance.module
			);
		}

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
				PortDirection::Input => self.add_expression(expr, SignalRole::AssignmentSource, position, None)?,
				PortDirection::Output => self.add_expression(expr, SignalRole::AssignmentTarget, position, None)?,
				PortDirection::Inout => {
					self.add_expression(expr, SignalRole::AssignmentTarget, position, None)?;
					self.add_expression(expr, SignalRole::AssignmentSource, position, None)?;
				},
			}
		}

		Ok(())
	}

	fn add_statement(&mut self, stmt: &RegionStatement) -> Result<(), ExtractError> {
		let position = stmt.position;
		match stmt.kind {
			RegionStatementKind::Declaration(decl) => {
				for declared in &decl.names {
					if let Some(init) = &declared.init {
						let target = Expression::signal(&declared.name);
						self.add_expression(&target, SignalRole::AssignmentTarget, position, None)?;
						self.add_expression(init, SignalRole::AssignmentSource, position, None)?;
					}
				}
			},
			RegionStatementKind::Assign(assign) => {
				self.add_expression(&assign.lhs, SignalRole::AssignmentTarget, position, None)?;
				self.add_expression(&assign.rhs, SignalRole::AssignmentSource, position, None)?;
			},
			RegionStatementKind::Instance(instance) => self.add_instance(instance, position)?,
			RegionStatementKind::InlineInstance(instance) => self.add_inline_instance(instance, position)?,
			RegionStatementKind::Process(process) => {
				let mut exprs = Vec::new();
				process.walk(&mut |expr, usage| exprs.push((expr, usage)));
				for (expr, usage) in exprs {
					let role = match usage {
						ExprUse::Target => SignalRole::AssignmentTarget,
						ExprUse::Read => SignalRole::AssignmentSource,
					};
					self.add_expression(expr, role, position, None)?;
				}
			},
		}
		Ok(())
	}
}

/// Classifies every signal reference inside the region
pub fn classify<P: InterfaceProvider + ?Sized>(
	statements: &[RegionStatement],
	interfaces: &P,
) -> Result<Vec<SignalReference>, ExtractError> {
	let mut classifier = StatementClassifier {
		interfaces,
		references: Vec::new(),
	};

	for stmt in statements {
		classifier.add_statement(stmt)?;
	}

	Ok(classifier.references)
}
