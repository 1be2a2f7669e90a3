use thiserror::Error;

use super::expression::{BinaryExpression, UnaryExpression};
use super::{BinaryOp, Expression, UnaryOp};

/// Reasons for which an expression cannot be folded into an integer
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
	#[error("Expression depends on signal '{0}'")]
	NotConstant(String),

	#[error("Operation cannot be evaluated at analysis time")]
	NarrowEvalNotSupported,

	#[error("Evaluation result does not fit in 64 bits")]
	NarrowEvalRange,
}

/// Folds constant integer expressions (select bounds, declaration ranges)
pub trait NarrowEval {
	fn narrow_eval(&self) -> Result<i64, EvalError>;
}

impl NarrowEval for BinaryExpression {
	fn narrow_eval(&self) -> Result<i64, EvalError> {
		use BinaryOp::*;
		let lhs = self.lhs.narrow_eval()?;
		let rhs = self.rhs.narrow_eval()?;

		let result = match self.op {
			Add => lhs.checked_add(rhs),
			Subtract => lhs.checked_sub(rhs),
			Multiply => lhs.checked_mul(rhs),
			ShiftLeft | ArithShiftLeft => u32::try_from(rhs).ok().and_then(|s| lhs.checked_shl(s)),
			ShiftRight | ArithShiftRight => u32::try_from(rhs).ok().and_then(|s| lhs.checked_shr(s)),
			_ => return Err(EvalError::NarrowEvalNotSupported),
		};

		result.ok_or(EvalError::NarrowEvalRange)
	}
}

impl NarrowEval for UnaryExpression {
	fn narrow_eval(&self) -> Result<i64, EvalError> {
		let operand = self.operand.narrow_eval()?;
		match self.op {
			UnaryOp::Plus => Ok(operand),
			UnaryOp::Negate => operand.checked_neg().ok_or(EvalError::NarrowEvalRange),
			_ => Err(EvalError::NarrowEvalNotSupported),
		}
	}
}

impl NarrowEval for Expression {
	fn narrow_eval(&self) -> Result<i64, EvalError> {
		use Expression::*;

		match self {
			Constant(nc) => Ok(nc.value),
			Binary(expr) => expr.narrow_eval(),
			Unary(expr) => expr.narrow_eval(),
			Signal(access) => Err(EvalError::NotConstant(access.name.clone())),
			_ => {
				let mut dependency = None;
				self.for_each_access(&mut |access| {
					dependency.get_or_insert_with(|| access.name.clone());
				});
				Err(dependency.map_or(EvalError::NarrowEvalNotSupported, EvalError::NotConstant))
			},
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(Expression::from(7), 7)]
	#[case(Expression::from(8) - Expression::from(1), 7)]
	#[case(Expression::from(2) * Expression::from(4) + Expression::from(1), 9)]
	#[case(Expression::from(1) << Expression::from(4), 16)]
	#[case(-Expression::from(3), -3)]
	fn folds_constants(#[case] expr: Expression, #[case] expected: i64) {
		assert_eq!(expr.narrow_eval(), Ok(expected));
	}

	#[test]
	fn signal_is_not_constant() {
		let expr = Expression::signal("WIDTH") - Expression::from(1);
		assert_eq!(expr.narrow_eval(), Err(EvalError::NotConstant("WIDTH".into())));
	}

	#[test]
	fn unsupported_operation() {
		let expr = Expression::from(6) / Expression::from(2);
		assert_eq!(expr.narrow_eval(), Err(EvalError::NarrowEvalNotSupported));
	}

	#[test]
	fn overflow_is_reported() {
		let expr = Expression::from(i64::MAX) + Expression::from(1);
		assert_eq!(expr.narrow_eval(), Err(EvalError::NarrowEvalRange));
	}
}
