use thiserror::Error;

use crate::stream::EvalError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictingDeclarationError {
	pub name: String,
	pub first_position: usize,
	pub first_width: u32,
	pub first_signed: bool,
	pub second_position: usize,
	pub second_width: u32,
	pub second_signed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedInstanceInterfaceError {
	pub position: usize,
	pub module: String,
	pub instance: String,

	/// Offending formal port (`None` when the whole interface is missing)
	pub port: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MalformedSelectError {
	pub position: usize,
	pub signal: String,
	pub reason: SelectProblem,
}

/// Reason for rejecting a bit- or range-select
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SelectProblem {
	#[error(transparent)]
	NotConstant(#[from] EvalError),

	#[error("negative bound {0}")]
	NegativeBound(i64),

	#[error("bound {0} does not fit a bit index")]
	BoundTooLarge(i64),

	#[error("reversed range [{msb}:{lsb}]")]
	ReversedRange { msb: i64, lsb: i64 },
}

impl From<ConflictingDeclarationError> for ExtractError {
	fn from(err: ConflictingDeclarationError) -> Self {
		Self::ConflictingDeclaration(Box::new(err))
	}
}

impl From<UnresolvedInstanceInterfaceError> for ExtractError {
	fn from(err: UnresolvedInstanceInterfaceError) -> Self {
		Self::UnresolvedInstanceInterface(Box::new(err))
	}
}

impl From<MalformedSelectError> for ExtractError {
	fn from(err: MalformedSelectError) -> Self {
		Self::MalformedSelect(Box::new(err))
	}
}

/// Represents an error that aborts an analysis run.
/// Positions are indices into the statement stream.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExtractError {
	#[error("No extract region marker found")]
	RegionNotFound,

	#[error("Extract region starting at statement {begin} is never terminated")]
	UnterminatedRegion { begin: usize },

	#[error("More than one extract region (statements {first} and {second})")]
	AmbiguousRegion { first: usize, second: usize },

	#[error("End marker at statement {position} has no matching start marker")]
	UnexpectedEndMarker { position: usize },

	#[error("Signal '{}' declared with conflicting widths ({} and {})", .0.name, .0.first_width, .0.second_width)]
	ConflictingDeclaration(Box<ConflictingDeclarationError>),

	#[error("Interface of module '{}' (instance '{}') cannot be resolved", .0.module, .0.instance)]
	UnresolvedInstanceInterface(Box<UnresolvedInstanceInterfaceError>),

	#[error("Malformed select on signal '{}' at statement {}: {}", .0.signal, .0.position, .0.reason)]
	MalformedSelect(Box<MalformedSelectError>),

	#[error("Invalid name '{0}'")]
	InvalidName(String),
}

impl ExtractError {
	/// Statement position that triggered the error, if there is one
	pub fn position(&self) -> Option<usize> {
		use ExtractError::*;
		match self {
			RegionNotFound | InvalidName(_) => None,
			UnterminatedRegion { begin } => Some(*begin),
			AmbiguousRegion { second, .. } => Some(*second),
			UnexpectedEndMarker { position } => Some(*position),
			ConflictingDeclaration(e) => Some(e.second_position),
			UnresolvedInstanceInterface(e) => Some(e.position),
			MalformedSelect(e) => Some(e.position),
		}
	}
}
