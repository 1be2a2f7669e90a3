use serde::{Deserialize, Serialize};

/// Numeric literal as delivered by the front end
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericConstant {
	/// Value of the literal
	pub value: i64,

	/// Explicit literal width (`4'h9` has width 4), if any
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub width: Option<u32>,
}

impl NumericConstant {
	pub fn new(value: i64) -> Self {
		Self { value, width: None }
	}
}

/// Binary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
	Add,
	Subtract,
	Multiply,
	Divide,
	Modulo,
	Power,
	ShiftLeft,
	ShiftRight,
	ArithShiftLeft,
	ArithShiftRight,
	LogicalAnd,
	LogicalOr,
	BitwiseAnd,
	BitwiseOr,
	BitwiseXor,
	BitwiseXnor,
	Equal,
	NotEqual,
	CaseEqual,
	CaseNotEqual,
	Less,
	LessEqual,
	Greater,
	GreaterEqual,
}

/// Unary operators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
	Plus,
	Negate,
	LogicalNot,
	BitwiseNot,
	ReductionAnd,
	ReductionOr,
	ReductionXor,
	ReductionNand,
	ReductionNor,
	ReductionXnor,
}

/// Bounds of a range select or of a packed/unpacked declaration dimension
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
	pub msb: Box<Expression>,
	pub lsb: Box<Expression>,
}

impl Range {
	pub fn new(msb: Expression, lsb: Expression) -> Self {
		Self {
			msb: Box::new(msb),
			lsb: Box::new(lsb),
		}
	}

	/// Range with literal bounds, i.e. `[msb:lsb]`
	pub fn constant(msb: i64, lsb: i64) -> Self {
		Self::new(msb.into(), lsb.into())
	}
}

/// Determines which part of a signal is accessed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Select {
	/// The signal as a whole
	#[default]
	Whole,

	/// Single bit, i.e. `sig[i]`
	Bit(Box<Expression>),

	/// Range of bits (both ends inclusive), i.e. `sig[msb:lsb]`
	Range(Range),
}

/// Reference to a signal by its base name, possibly with a select suffix
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalAccess {
	/// Base name of the accessed signal
	pub name: String,

	/// Accessed part of the signal
	#[serde(default)]
	pub select: Select,
}

impl SignalAccess {
	pub fn is_whole(&self) -> bool {
		matches!(self.select, Select::Whole)
	}
}

/// Replication, i.e. `{count{value}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplicateExpression {
	pub count: Box<Expression>,
	pub value: Box<Expression>,
}

/// A binary expression
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
	/// Binary operator type
	pub op: BinaryOp,

	/// Left hand side expression
	pub lhs: Box<Expression>,

	/// Right hand side expression
	pub rhs: Box<Expression>,
}

/// A unary expression
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
	/// Unary operator type
	pub op: UnaryOp,

	/// Operand expression
	pub operand: Box<Expression>,
}

/// Ternary operator, i.e. `condition ? then : otherwise`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpression {
	pub condition: Box<Expression>,
	pub then: Box<Expression>,
	pub otherwise: Box<Expression>,
}

/// Function or system task call
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
	pub name: String,

	#[serde(default)]
	pub args: Vec<Expression>,
}

/// Structured HDL expression
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
	Constant(NumericConstant),
	Signal(SignalAccess),
	Concat(Vec<Expression>),
	Replicate(ReplicateExpression),
	Unary(UnaryExpression),
	Binary(BinaryExpression),
	Conditional(ConditionalExpression),
	Call(CallExpression),
}

impl Expression {
	/// Whole-signal access
	pub fn signal(name: &str) -> Self {
		Self::Signal(SignalAccess {
			name: name.into(),
			select: Select::Whole,
		})
	}

	/// Single bit access with a literal index
	pub fn bit(name: &str, index: i64) -> Self {
		Self::Signal(SignalAccess {
			name: name.into(),
			select: Select::Bit(Box::new(index.into())),
		})
	}

	/// Range access with literal bounds
	pub fn range(name: &str, msb: i64, lsb: i64) -> Self {
		Self::Signal(SignalAccess {
			name: name.into(),
			select: Select::Range(Range::constant(msb, lsb)),
		})
	}

	pub fn concat(parts: Vec<Expression>) -> Self {
		Self::Concat(parts)
	}

	pub fn replicate(count: Expression, value: Expression) -> Self {
		Self::Replicate(ReplicateExpression {
			count: Box::new(count),
			value: Box::new(value),
		})
	}

	pub fn unary(op: UnaryOp, operand: Expression) -> Self {
		Self::Unary(UnaryExpression {
			op,
			operand: Box::new(operand),
		})
	}

	pub fn binary(op: BinaryOp, lhs: Expression, rhs: Expression) -> Self {
		Self::Binary(BinaryExpression {
			op,
			lhs: Box::new(lhs),
			rhs: Box::new(rhs),
		})
	}

	pub fn conditional(condition: Expression, then: Expression, otherwise: Expression) -> Self {
		Self::Conditional(ConditionalExpression {
			condition: Box::new(condition),
			then: Box::new(then),
			otherwise: Box::new(otherwise),
		})
	}

	pub fn call(name: &str, args: Vec<Expression>) -> Self {
		Self::Call(CallExpression {
			name: name.into(),
			args,
		})
	}

	/// Visits every signal access in the expression, in textual order.
	///
	/// Index expressions of selects are visited after the access they belong to.
	pub fn for_each_access<'a, F>(&'a self, f: &mut F)
	where
		F: FnMut(&'a SignalAccess),
	{
		use Expression::*;
		match self {
			Constant(_) => {},
			Signal(access) => {
				f(access);
				match &access.select {
					Select::Whole => {},
					Select::Bit(index) => index.for_each_access(f),
					Select::Range(range) => {
						range.msb.for_each_access(f);
						range.lsb.for_each_access(f);
					},
				}
			},
			Concat(parts) => {
				for part in parts {
					part.for_each_access(f);
				}
			},
			Replicate(e) => {
				e.count.for_each_access(f);
				e.value.for_each_access(f);
			},
			Unary(e) => e.operand.for_each_access(f),
			Binary(e) => {
				e.lhs.for_each_access(f);
				e.rhs.for_each_access(f);
			},
			Conditional(e) => {
				e.condition.for_each_access(f);
				e.then.for_each_access(f);
				e.otherwise.for_each_access(f);
			},
			Call(e) => {
				for arg in &e.args {
					arg.for_each_access(f);
				}
			},
		}
	}

	/// Returns all signal accesses in textual order
	pub fn accesses(&self) -> Vec<&SignalAccess> {
		let mut result = Vec::new();
		self.for_each_access(&mut |access| result.push(access));
		result
	}

	/// Returns the accessed signal if the expression is a plain whole-signal reference
	pub fn as_whole_signal(&self) -> Option<&str> {
		match self {
			Self::Signal(access) if access.is_whole() => Some(&access.name),
			_ => None,
		}
	}
}

impl From<i64> for Expression {
	fn from(value: i64) -> Self {
		Self::Constant(NumericConstant::new(value))
	}
}

impl From<SignalAccess> for Expression {
	fn from(access: SignalAccess) -> Self {
		Self::Signal(access)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn accesses_in_textual_order() {
		// {data0[0], bbb} & aaa[3:1]
		let expr = Expression::concat(vec![Expression::bit("data0", 0), Expression::signal("bbb")])
			& Expression::range("aaa", 3, 1);

		let names: Vec<&str> = expr.accesses().iter().map(|a| a.name.as_str()).collect();
		assert_eq!(names, vec!["data0", "bbb", "aaa"]);
	}

	#[test]
	fn index_expressions_are_visited() {
		let expr = Expression::Signal(SignalAccess {
			name: "mem".into(),
			select: Select::Bit(Box::new(Expression::signal("sel"))),
		});

		let names: Vec<&str> = expr.accesses().iter().map(|a| a.name.as_str()).collect();
		assert_eq!(names, vec!["mem", "sel"]);
	}

	#[test]
	fn whole_signal_detection() {
		assert_eq!(Expression::signal("p").as_whole_signal(), Some("p"));
		assert_eq!(Expression::bit("p", 1).as_whole_signal(), None);
		assert_eq!(Expression::from(3).as_whole_signal(), None);
	}

	#[test]
	fn json_shape() {
		let expr: Expression = serde_json::from_str(
			r#"{"signal": {"name": "ccc", "select": {"range": {"msb": {"constant": {"value": 3}}, "lsb": {"constant": {"value": 1}}}}}}"#,
		)
		.unwrap();
		assert_eq!(expr, Expression::range("ccc", 3, 1));

		let expr: Expression = serde_json::from_str(r#"{"signal": {"name": "bbb"}}"#).unwrap();
		assert_eq!(expr, Expression::signal("bbb"));
	}
}
