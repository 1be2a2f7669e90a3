use serde::{Deserialize, Serialize};

use super::Expression;

/// Named port connection, i.e. `.port(expr)`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
	pub port: String,

	/// Connected expression (`None` for `.port()`)
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expr: Option<Expression>,
}

/// Module instantiation with named connections
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instance {
	/// Name of the instantiated module
	pub module: String,

	/// Instance name
	pub name: String,

	#[serde(default)]
	pub connections: Vec<Connection>,
}

impl Instance {
	pub fn new(module: &str, name: &str) -> Self {
		Self {
			module: module.into(),
			name: name.into(),
			connections: vec![],
		}
	}

	/// Binds an expression to a formal port
	pub fn connect(mut self, port: &str, expr: Expression) -> Self {
		self.connections.push(Connection {
			port: port.into(),
			expr: Some(expr),
		});
		self
	}

	/// Leaves a formal port explicitly unconnected
	pub fn unconnected(mut self, port: &str) -> Self {
		self.connections.push(Connection {
			port: port.into(),
			expr: None,
		});
		self
	}
}
