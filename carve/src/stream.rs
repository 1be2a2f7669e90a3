//! Structured statement stream delivered by the HDL front end.
//!
//! The stream describes a single flat module scope: declarations, continuous
//! assignments, instances, procedural blocks and the region markers.

pub mod declaration;
pub mod expression;
pub mod expression_ops;
pub mod instance;
pub mod interface;
pub mod narrow_eval;
pub mod process;

pub use declaration::{Declaration, DeclaredName, StorageKind};
pub use expression::{BinaryOp, Expression, NumericConstant, Range, Select, SignalAccess, UnaryOp};
pub use instance::{Connection, Instance};
pub use interface::{FormalPort, InterfaceLibrary, InterfaceProvider, ModuleInterface, PortDirection};
pub use narrow_eval::{EvalError, NarrowEval};
pub use process::{CaseItem, ExprUse, ProcStatement, Process, ProcessKind};

use serde::{Deserialize, Serialize};

/// Region boundary markers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
	/// Start of the region to be extracted
	ExtractBegin,

	/// End of the region to be extracted
	ExtractEnd,

	/// Start of an inline-expansion zone
	InlineBegin,

	/// End of an inline-expansion zone
	InlineEnd,
}

/// Continuous assignment, i.e. `assign lhs = rhs;`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
	pub lhs: Expression,
	pub rhs: Expression,
}

/// Module-level statement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
	Declaration(Declaration),
	Assign(Assignment),
	Instance(Instance),
	Process(Process),
	Marker { marker: Marker },
}

impl Statement {
	pub fn assign(lhs: Expression, rhs: Expression) -> Self {
		Self::Assign(Assignment { lhs, rhs })
	}

	pub fn marker(marker: Marker) -> Self {
		Self::Marker { marker }
	}

	pub fn as_marker(&self) -> Option<Marker> {
		match self {
			Self::Marker { marker } => Some(*marker),
			_ => None,
		}
	}
}

impl From<Declaration> for Statement {
	fn from(decl: Declaration) -> Self {
		Self::Declaration(decl)
	}
}

impl From<Instance> for Statement {
	fn from(instance: Instance) -> Self {
		Self::Instance(instance)
	}
}

impl From<Process> for Statement {
	fn from(process: Process) -> Self {
		Self::Process(process)
	}
}
