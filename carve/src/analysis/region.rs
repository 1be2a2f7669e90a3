use log::debug;

use crate::error::ExtractError;
use crate::stream::{Assignment, Declaration, Instance, Marker, Process, Statement};

/// Nested zone whose instances are expanded inline into the parent region
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineZone {
	/// Position of the inline start marker
	pub begin: usize,

	/// Position of the inline end marker
	pub end: usize,

	/// Zones nested inside this one
	pub nested: Vec<InlineZone>,
}

impl InlineZone {
	fn contains(&self, position: usize) -> bool {
		self.begin < position && position < self.end
	}
}

/// Boundaries of the region to be extracted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionBoundary {
	/// Position of the extract start marker
	pub begin: usize,

	/// Position of the extract end marker
	pub end: usize,

	/// Top-level inline-expansion zones
	pub inline_zones: Vec<InlineZone>,
}

/// Region statement, dispatched by kind once during location
#[derive(Clone, Copy, Debug)]
pub enum RegionStatementKind<'a> {
	Declaration(&'a Declaration),
	Assign(&'a Assignment),
	Instance(&'a Instance),

	/// Instance inside an inline-expansion zone, its connections
	/// behave like bare references
	InlineInstance(&'a Instance),

	Process(&'a Process),
}

#[derive(Clone, Copy, Debug)]
pub struct RegionStatement<'a> {
	/// Position in the statement stream
	pub position: usize,
	pub kind: RegionStatementKind<'a>,
}

impl RegionBoundary {
	/// Finds the single extract region and its inline zones
	pub fn locate(stream: &[Statement]) -> Result<Self, ExtractError> {
		let mut begin: Option<usize> = None;
		let mut end: Option<usize> = None;

		for (position, stmt) in stream.iter().enumerate() {
			match stmt.as_marker() {
				Some(Marker::ExtractBegin) => {
					if let Some(first) = begin {
						return Err(ExtractError::AmbiguousRegion { first, second: position });
					}
					begin = Some(position);
				},
				Some(Marker::ExtractEnd) => {
					if begin.is_none() || end.is_some() {
						return Err(ExtractError::UnexpectedEndMarker { position });
					}
					end = Some(position);
				},
				_ => {},
			}
		}

		let begin = begin.ok_or(ExtractError::RegionNotFound)?;
		let end = end.ok_or(ExtractError::UnterminatedRegion { begin })?;
		let inline_zones = Self::locate_inline_zones(stream, begin, end)?;

		debug!(
			"Located region [{}, {}] with {} inline zone(s)",
			begin,
			end,
			inline_zones.len()
		);
		Ok(Self {
			begin,
			end,
			inline_zones,
		})
	}

	fn locate_inline_zones(stream: &[Statement], begin: usize, end: usize) -> Result<Vec<InlineZone>, ExtractError> {
		let mut top_level = Vec::new();
		let mut open: Vec<(usize, Vec<InlineZone>)> = Vec::new();

		for position in begin + 1..end {
			match stream[position].as_marker() {
				Some(Marker::InlineBegin) => open.push((position, Vec::new())),
				Some(Marker::InlineEnd) => {
					let (zone_begin, nested) = open.pop().ok_or(ExtractError::UnexpectedEndMarker { position })?;
					let zone = InlineZone {
						begin: zone_begin,
						end: position,
						nested,
					};

					match open.last_mut() {
						Some((_, parent)) => parent.push(zone),
						None => top_level.push(zone),
					}
				},
				_ => {},
			}
		}

		if let Some((zone_begin, _)) = open.last() {
			return Err(ExtractError::UnterminatedRegion { begin: *zone_begin });
		}

		Ok(top_level)
	}

	/// Checks whether the position lies strictly inside the region
	pub fn contains(&self, position: usize) -> bool {
		self.begin < position && position < self.end
	}

	/// Checks whether the position lies inside any inline-expansion zone
	pub fn is_inline(&self, position: usize) -> bool {
		self.inline_zones.iter().any(|z| z.contains(position))
	}

	/// Positions of all statements outside the region
	pub fn outside_positions(&self, len: usize) -> impl Iterator<Item = usize> {
		(0..self.begin).chain(self.end + 1..len)
	}

	/// Returns non-marker statements inside the region in stream order
	pub fn statements<'a>(&self, stream: &'a [Statement]) -> Vec<RegionStatement<'a>> {
		let mut result = Vec::new();
		for position in self.begin + 1..self.end {
			let kind = match &stream[position] {
				Statement::Marker { .. } => continue,
				Statement::Declaration(decl) => RegionStatementKind::Declaration(decl),
				Statement::Assign(assign) => RegionStatementKind::Assign(assign),
				Statement::Instance(instance) if self.is_inline(position) => {
					RegionStatementKind::InlineInstance(instance)
				},
				Statement::Instance(instance) => RegionStatementKind::Instance(instance),
				Statement::Process(process) => RegionStatementKind::Process(process),
			};
			result.push(RegionStatement { position, kind });
		}
		result
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::stream::Expression;
	use rstest::rstest;

	fn marker(m: Marker) -> Statement {
		Statement::marker(m)
	}

	fn filler() -> Statement {
		Statement::assign(Expression::signal("a"), Expression::signal("b"))
	}

	#[test]
	fn simple_region() -> Result<(), ExtractError> {
		let stream = vec![
			filler(),
			marker(Marker::ExtractBegin),
			filler(),
			filler(),
			marker(Marker::ExtractEnd),
			filler(),
		];

		let region = RegionBoundary::locate(&stream)?;
		assert_eq!((region.begin, region.end), (1, 4));
		assert!(region.inline_zones.is_empty());
		assert!(region.contains(2) && region.contains(3));
		assert!(!region.contains(1) && !region.contains(4));
		assert_eq!(region.outside_positions(stream.len()).collect::<Vec<_>>(), vec![0, 5]);
		assert_eq!(region.statements(&stream).len(), 2);
		Ok(())
	}

	#[test]
	fn nested_inline_zones() -> Result<(), ExtractError> {
		let stream = vec![
			marker(Marker::ExtractBegin),
			marker(Marker::InlineBegin),
			marker(Marker::InlineBegin),
			filler(),
			marker(Marker::InlineEnd),
			marker(Marker::InlineEnd),
			filler(),
			marker(Marker::ExtractEnd),
		];

		let region = RegionBoundary::locate(&stream)?;
		assert_eq!(region.inline_zones.len(), 1);
		assert_eq!(region.inline_zones[0].begin, 1);
		assert_eq!(region.inline_zones[0].end, 5);
		assert_eq!(region.inline_zones[0].nested.len(), 1);
		assert!(region.is_inline(3));
		assert!(!region.is_inline(6));
		Ok(())
	}

	#[test]
	fn inline_markers_outside_are_ignored() -> Result<(), ExtractError> {
		let stream = vec![
			marker(Marker::InlineBegin),
			marker(Marker::ExtractBegin),
			filler(),
			marker(Marker::ExtractEnd),
		];

		let region = RegionBoundary::locate(&stream)?;
		assert!(region.inline_zones.is_empty());
		Ok(())
	}

	#[rstest]
	#[case(vec![filler()], ExtractError::RegionNotFound)]
	#[case(vec![marker(Marker::ExtractBegin), filler()], ExtractError::UnterminatedRegion { begin: 0 })]
	#[case(
		vec![marker(Marker::ExtractBegin), marker(Marker::ExtractBegin), marker(Marker::ExtractEnd)],
		ExtractError::AmbiguousRegion { first: 0, second: 1 }
	)]
	#[case(
		vec![
			marker(Marker::ExtractBegin),
			marker(Marker::ExtractEnd),
			marker(Marker::ExtractBegin),
			marker(Marker::ExtractEnd),
		],
		ExtractError::AmbiguousRegion { first: 0, second: 2 }
	)]
	#[case(vec![marker(Marker::ExtractEnd)], ExtractError::UnexpectedEndMarker { position: 0 })]
	#[case(
		vec![marker(Marker::ExtractBegin), marker(Marker::InlineBegin), marker(Marker::ExtractEnd)],
		ExtractError::UnterminatedRegion { begin: 1 }
	)]
	#[case(
		vec![marker(Marker::ExtractBegin), marker(Marker::InlineEnd), marker(Marker::ExtractEnd)],
		ExtractError::UnexpectedEndMarker { position: 1 }
	)]
	fn malformed_regions(#[case] stream: Vec<Statement>, #[case] expected: ExtractError) {
		assert_eq!(RegionBoundary::locate(&stream), Err(expected));
	}
}
