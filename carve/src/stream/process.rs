use serde::{Deserialize, Serialize};

use super::Expression;

/// Procedural block flavour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
	Always,
	AlwaysComb,
	AlwaysFf,
	AlwaysLatch,
	Initial,
}

/// Single `case` item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseItem {
	pub labels: Vec<Expression>,
	pub body: Vec<ProcStatement>,
}

/// Statement inside a procedural block
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcStatement {
	/// Blocking or nonblocking procedural assignment
	Assign {
		target: Expression,
		value: Expression,
		#[serde(default)]
		nonblocking: bool,
	},

	If {
		condition: Expression,
		then: Vec<ProcStatement>,
		#[serde(default)]
		otherwise: Vec<ProcStatement>,
	},

	Case {
		subject: Expression,
		items: Vec<CaseItem>,
		#[serde(default)]
		default: Vec<ProcStatement>,
	},

	/// Expression evaluated for side effects, e.g. a system task call
	Eval { expr: Expression },
}

/// Role of an expression within a procedural block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprUse {
	/// Left hand side of a procedural assignment
	Target,

	/// Anything that is read
	Read,
}

/// Procedural block, i.e. `always_ff @(posedge clk) ...`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Process {
	pub trigger: ProcessKind,

	/// Event expressions (edge qualifiers are irrelevant here)
	#[serde(default)]
	pub sensitivity: Vec<Expression>,

	pub body: Vec<ProcStatement>,
}

impl Process {
	pub fn new(trigger: ProcessKind) -> Self {
		Self {
			trigger,
			sensitivity: vec![],
			body: vec![],
		}
	}

	pub fn on(mut self, event: Expression) -> Self {
		self.sensitivity.push(event);
		self
	}

	pub fn with(mut self, statement: ProcStatement) -> Self {
		self.body.push(statement);
		self
	}

	/// Visits every top-level expression of the block in textual order
	pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a Expression, ExprUse)) {
		for event in &self.sensitivity {
			f(event, ExprUse::Read);
		}
		walk_statements(&self.body, f);
	}
}

fn walk_statements<'a>(statements: &'a [ProcStatement], f: &mut dyn FnMut(&'a Expression, ExprUse)) {
	for statement in statements {
		use ProcStatement::*;
		match statement {
			Assign { target, value, .. } => {
				f(target, ExprUse::Target);
				f(value, ExprUse::Read);
			},
			If {
				condition,
				then,
				otherwise,
			} => {
				f(condition, ExprUse::Read);
				walk_statements(then, f);
				walk_statements(otherwise, f);
			},
			Case { subject, items, default } => {
				f(subject, ExprUse::Read);
				for item in items {
					for label in &item.labels {
						f(label, ExprUse::Read);
					}
					walk_statements(&item.body, f);
				}
				walk_statements(default, f);
			},
			Eval { expr } => f(expr, ExprUse::Read),
		}
	}
}
