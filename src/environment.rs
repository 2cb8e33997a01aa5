use std::collections::HashMap;

use super::value::Value;

/// Variables of one session. Created empty and kept across submissions.
#[derive(Debug, Clone, Default)]
pub struct Environment
{
	vars: HashMap<String, Value>,
}

impl Environment
{
	pub fn new() -> Self
	{
		Self::default()
	}

	/// Value of `name`, or numeric zero when it was never assigned.
	pub fn get(&self, name: &str) -> Value
	{
		self.lookup(name).cloned().unwrap_or_else(Value::zero)
	}

	pub fn lookup(&self, name: &str) -> Option<&Value>
	{
		self.vars.get(name)
	}

	pub fn set<S>(&mut self, name: S, value: Value) where S: Into<String>
	{
		self.vars.insert(name.into(), value);
	}

	pub fn len(&self) -> usize
	{
		self.vars.len()
	}

	pub fn is_empty(&self) -> bool
	{
		self.vars.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)>
	{
		self.vars.iter().map(|(k, v)| (k.as_str(), v))
	}
}
