use std::ops::Shl;

use num_bigint::BigUint;

/// Set of bits of a signal touched by partial accesses.
/// Grows as needed, so the final width does not have to be known up front.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoverageMask {
	mask: BigUint,
}

impl CoverageMask {
	pub fn new() -> Self {
		Self {
			mask: BigUint::from(0u32),
		}
	}

	/// Marks bits `lsb..=msb` as covered. Returns true if any of them was already covered.
	pub fn cover_bits(&mut self, lsb: u32, msb: u32) -> bool {
		assert!(lsb <= msb);
		let count = u64::from(msb - lsb) + 1;
		let range = (BigUint::from(1u32).shl(count) - 1u32).shl(lsb);
		let overlap = (&self.mask & &range) != BigUint::from(0u32);
		self.mask |= range;
		overlap
	}

	pub fn get_bit(&self, bit: u32) -> bool {
		self.mask.bit(bit as u64)
	}

	/// Uncovered bit ranges below `width` as `(lsb, msb)` pairs, ascending
	pub fn gaps(&self, width: u32) -> Vec<(u32, u32)> {
		let mut ranges = vec![];

		let mut group_start = None;
		for i in 0..width {
			match (self.get_bit(i), group_start) {
				(false, None) => group_start = Some(i),
				(true, Some(start)) => {
					ranges.push((start, i - 1));
					group_start = None;
				},
				_ => {},
			}
		}

		if let Some(start) = group_start {
			ranges.push((start, width - 1));
		}

		ranges
	}
}
