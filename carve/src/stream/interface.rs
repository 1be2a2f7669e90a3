use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Specifies direction for signals in a module interface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
	/// Input signal (from the perspective of the module)
	Input,

	/// Output signal (from the perspective of the module)
	Output,

	/// Bidirectional signal
	Inout,
}

impl PortDirection {
	pub fn keyword(&self) -> &'static str {
		match self {
			Self::Input => "input",
			Self::Output => "output",
			Self::Inout => "inout",
		}
	}
}

fn default_width() -> u32 {
	1
}

fn deserialize_width<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
	let width = u32::deserialize(deserializer)?;
	if width == 0 {
		return Err(serde::de::Error::custom("port width must be at least 1"));
	}
	Ok(width)
}

/// Formal port of an instantiable module
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormalPort {
	pub name: String,
	pub direction: PortDirection,

	#[serde(default = "default_width", deserialize_with = "deserialize_width")]
	pub width: u32,

	#[serde(default)]
	pub signed: bool,
}

impl FormalPort {
	pub fn new(name: &str, direction: PortDirection, width: u32) -> Self {
		Self {
			name: name.into(),
			direction,
			width,
			signed: false,
		}
	}
}

/// Port list of a module which can be instantiated inside the analyzed region
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInterface {
	pub name: String,
	pub ports: Vec<FormalPort>,
}

impl ModuleInterface {
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			ports: vec![],
		}
	}

	/// Appends a formal port to the interface
	pub fn port(mut self, name: &str, direction: PortDirection, width: u32) -> Self {
		self.ports.push(FormalPort::new(name, direction, width));
		self
	}

	pub fn input(self, name: &str, width: u32) -> Self {
		self.port(name, PortDirection::Input, width)
	}

	pub fn output(self, name: &str, width: u32) -> Self {
		self.port(name, PortDirection::Output, width)
	}

	pub fn get_port(&self, name: &str) -> Option<&FormalPort> {
		self.ports.iter().find(|p| p.name == name)
	}
}

/// Source of formal port lists for instantiated modules
pub trait InterfaceProvider {
	fn interface(&self, module: &str) -> Option<&ModuleInterface>;
}

impl InterfaceProvider for HashMap<String, ModuleInterface> {
	fn interface(&self, module: &str) -> Option<&ModuleInterface> {
		self.get(module)
	}
}

/// Map-backed interface provider
#[derive(Clone, Debug, Default)]
pub struct InterfaceLibrary {
	modules: HashMap<String, ModuleInterface>,
}

impl InterfaceLibrary {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a module interface. Returns the previously registered one, if any.
	pub fn add(&mut self, interface: ModuleInterface) -> Option<ModuleInterface> {
		self.modules.insert(interface.name.clone(), interface)
	}

	pub fn with(mut self, interface: ModuleInterface) -> Self {
		self.add(interface);
		self
	}

	pub fn len(&self) -> usize {
		self.modules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.is_empty()
	}
}

impl FromIterator<ModuleInterface> for InterfaceLibrary {
	fn from_iter<T: IntoIterator<Item = ModuleInterface>>(iter: T) -> Self {
		let mut library = Self::new();
		for interface in iter {
			library.add(interface);
		}
		library
	}
}

impl InterfaceProvider for InterfaceLibrary {
	fn interface(&self, module: &str) -> Option<&ModuleInterface> {
		self.modules.get(module)
	}
}
