use std::fmt::Display;

use log::{debug, warn};
use serde::Serialize;
use thiserror::Error;

pub trait SeverityPolicy {
	fn severity(&self, kind: &ExtractMessageKind) -> ExtractMessageSeverity;
}

pub struct DefaultSeverityPolicy;

impl SeverityPolicy for DefaultSeverityPolicy {
	fn severity(&self, kind: &ExtractMessageKind) -> ExtractMessageSeverity {
		use ExtractMessageKind::*;
		use ExtractMessageSeverity::*;
		match kind {
			SelectExceedsDeclaredWidth { .. } => Warning,
			UnresolvedDeclarationWidth { .. } => Warning,
			PartialCoverage { .. } => Info,
			InferredWidth { .. } => Info,
			ArrayDeclarationIgnored { .. } => Info,
		}
	}
}

/// Non-fatal findings of a single analysis run
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExtractReport {
	messages: Vec<ExtractMessage>,
}

impl ExtractReport {
	pub fn add_message(&mut self, msg: ExtractMessage) {
		match msg.severity {
			ExtractMessageSeverity::Warning => warn!("{}", msg),
			_ => debug!("Extract message: {}", msg),
		}
		self.messages.push(msg);
	}

	pub fn add(&mut self, kind: ExtractMessageKind) {
		self.add_message(ExtractMessage::new(kind, None));
	}

	pub fn messages(&self) -> &[ExtractMessage] {
		&self.messages
	}

	pub fn has_warnings(&self) -> bool {
		self.messages
			.iter()
			.any(|m| m.severity >= ExtractMessageSeverity::Warning)
	}
}

#[derive(Clone, Debug, Serialize)]
pub struct ExtractMessage {
	kind: ExtractMessageKind,
	severity: ExtractMessageSeverity,
}

impl ExtractMessage {
	pub fn new(kind: ExtractMessageKind, policy: Option<&dyn SeverityPolicy>) -> Self {
		let severity = policy.unwrap_or(&DefaultSeverityPolicy).severity(&kind);
		Self { kind, severity }
	}

	pub fn kind(&self) -> &ExtractMessageKind {
		&self.kind
	}

	pub fn severity(&self) -> ExtractMessageSeverity {
		self.severity
	}
}

impl Display for ExtractMessage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}: {}", self.severity, self.kind)
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractMessageSeverity {
	Info,
	Warning,
	Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractMessageKind {
	#[error("Select on '{signal}' reaches bit {extent} but the declaration is only {declared_width} bits wide")]
	SelectExceedsDeclaredWidth {
		signal: String,
		declared_width: u32,
		extent: u32,
	},

	#[error("Declared width of '{signal}' is not constant, declaration ignored")]
	UnresolvedDeclarationWidth { signal: String },

	#[error("Bits of '{signal}' are never driven inside the region: {uncovered:?}")]
	PartialCoverage { signal: String, uncovered: Vec<(u32, u32)> },

	#[error("Width of undeclared signal '{signal}' inferred as {width}")]
	InferredWidth { signal: String, width: u32 },

	#[error("Array declaration of '{signal}' does not provide a width")]
	ArrayDeclarationIgnored { signal: String },
}
