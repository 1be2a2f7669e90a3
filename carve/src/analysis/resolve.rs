use log::debug;
use serde::Serialize;

use super::unify::{SignalTable, UnifiedSignal};

/// What a unified signal becomes in the extracted module
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
	InputPort,
	OutputPort,
	InternalWire,

	/// Neither produced nor consumed inside, not part of the module at all
	Unused,
}

impl Resolution {
	pub fn is_port(&self) -> bool {
		matches!(self, Self::InputPort | Self::OutputPort)
	}
}

/// Decides the role of a signal from where it is produced and consumed.
/// The order of reads and writes inside the region is irrelevant.
pub fn resolve(signal: &UnifiedSignal) -> Resolution {
	match (signal.produced_inside, signal.consumed_inside, signal.referenced_outside) {
		(false, true, _) => Resolution::InputPort,
		(true, _, false) => Resolution::InternalWire,
		(true, _, true) => Resolution::OutputPort,
		(false, false, _) => Resolution::Unused,
	}
}

#[derive(Clone, Copy, Debug)]
pub struct ResolvedSignal<'a> {
	pub signal: &'a UnifiedSignal,
	pub resolution: Resolution,
}

/// Resolves every signal of the table, preserving its order
pub fn resolve_all(table: &SignalTable) -> Vec<ResolvedSignal<'_>> {
	table
		.iter()
		.map(|signal| {
			let resolution = resolve(signal);
			debug!("'{}' resolved as {:?}", signal.name, resolution);
			ResolvedSignal { signal, resolution }
		})
		.collect()
}
