use serde::{Deserialize, Serialize};

use super::{Expression, PortDirection, Range};

/// Storage keyword of a declaration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
	Wire,
	Logic,
	Reg,
}

impl StorageKind {
	pub fn keyword(&self) -> &'static str {
		match self {
			Self::Wire => "wire",
			Self::Logic => "logic",
			Self::Reg => "reg",
		}
	}
}

/// Single name introduced by a declaration statement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeclaredName {
	pub name: String,

	/// Unpacked dimensions (arrays only, empty otherwise)
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub unpacked: Vec<Range>,

	/// Initializer, i.e. `wire en = a & b;`
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub init: Option<Expression>,
}

impl DeclaredName {
	pub fn is_array(&self) -> bool {
		!self.unpacked.is_empty()
	}
}

/// Signal declaration statement, possibly introducing multiple names
/// sharing one packed range, e.g. `logic signed [7:0] data0, data1;`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
	pub storage: StorageKind,

	#[serde(default)]
	pub signed: bool,

	/// Packed range (`None` for scalars)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub packed: Option<Range>,

	/// Set when this is a port declaration of the enclosing module
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub direction: Option<PortDirection>,

	pub names: Vec<DeclaredName>,
}

impl Declaration {
	/// Starts building a new declaration
	pub fn new(storage: StorageKind) -> Self {
		Self {
			storage,
			signed: false,
			packed: None,
			direction: None,
			names: vec![],
		}
	}

	pub fn logic() -> Self {
		Self::new(StorageKind::Logic)
	}

	pub fn wire() -> Self {
		Self::new(StorageKind::Wire)
	}

	pub fn reg() -> Self {
		Self::new(StorageKind::Reg)
	}

	/// Marks declaration as signed
	pub fn signed(mut self) -> Self {
		self.signed = true;
		self
	}

	/// Sets a literal packed range, i.e. `[msb:lsb]`
	pub fn packed(self, msb: i64, lsb: i64) -> Self {
		self.packed_range(Range::constant(msb, lsb))
	}

	pub fn packed_range(mut self, range: Range) -> Self {
		self.packed = Some(range);
		self
	}

	/// Turns the declaration into a port declaration of the enclosing module
	pub fn port(mut self, direction: PortDirection) -> Self {
		self.direction = Some(direction);
		self
	}

	/// Adds a plain name to the declaration
	pub fn name(mut self, name: &str) -> Self {
		self.names.push(DeclaredName {
			name: name.into(),
			unpacked: vec![],
			init: None,
		});
		self
	}

	/// Adds a name with an unpacked dimension
	pub fn array_name(mut self, name: &str, dimension: Range) -> Self {
		self.names.push(DeclaredName {
			name: name.into(),
			unpacked: vec![dimension],
			init: None,
		});
		self
	}

	/// Adds a name with an initializer
	pub fn init_name(mut self, name: &str, init: Expression) -> Self {
		self.names.push(DeclaredName {
			name: name.into(),
			unpacked: vec![],
			init: Some(init),
		});
		self
	}
}
