use std::{
	cmp::Ordering,
	fmt::{self, Display},
};

use super::ast::{BinaryOp, UnaryOp};
use super::interpreter::Fault;
use super::utils::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number
{
	Int(i64),
	Float(f64),
}

impl Number
{
	pub fn as_f64(self) -> f64
	{
		match self
		{
			Number::Int(n) => n as f64,
			Number::Float(x) => x,
		}
	}

	pub fn is_zero(self) -> bool
	{
		match self
		{
			Number::Int(n) => n == 0,
			Number::Float(x) => x == 0.0,
		}
	}

	/// Integral value of the number, if it has one.
	pub fn as_integer(self) -> Option<i64>
	{
		match self
		{
			Number::Int(n) => Some(n),
			// i64::MAX as f64 rounds up to 2^63, which is already out of range.
			Number::Float(x) if x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 => Some(x as i64),
			Number::Float(_) => None,
		}
	}

	fn arith(self, op: BinaryOp, rhs: Number) -> Result<Number, Fault>
	{
		if let (Number::Int(a), Number::Int(b)) = (self, rhs)
		{
			let ret = match op
			{
				BinaryOp::Add => a.checked_add(b),
				BinaryOp::Sub => a.checked_sub(b),
				BinaryOp::Mul => a.checked_mul(b),
				_ => None,
			};

			if op != BinaryOp::Div
			{
				return ret.map(Number::Int).ok_or(Fault::Overflow(op));
			}
		}

		let (a, b) = (self.as_f64(), rhs.as_f64());
		Ok(Number::Float(match op
		{
			BinaryOp::Add => a + b,
			BinaryOp::Sub => a - b,
			BinaryOp::Mul => a * b,
			_ => a / b,
		}))
	}

	fn compare(self, rhs: Number) -> Option<Ordering>
	{
		match (self, rhs)
		{
			(Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
			(a, b) => a.as_f64().partial_cmp(&b.as_f64()),
		}
	}
}

impl Display for Number
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			Number::Int(n) => write!(f, "{}", n),
			Number::Float(x) => write!(f, "{}", format_float(*x)),
		}
	}
}

/// Runtime value.
///
/// Text comes in two kinds. `Quoted` is what string literals and input answers
/// evaluate to: the delimiter quotes are part of the value. `Text` is the plain
/// result of a concatenation and has no delimiters. Both compare and test
/// truthiness by their content.
#[derive(Debug, Clone, PartialEq)]
pub enum Value
{
	Number(Number),
	Quoted(String),
	Text(String),
	Bool(bool),
}

impl Value
{
	pub fn zero() -> Value
	{
		Value::Number(Number::Int(0))
	}

	pub fn kind(&self) -> &'static str
	{
		match self
		{
			Value::Number(_) => "number",
			Value::Quoted(_) | Value::Text(_) => "text",
			Value::Bool(_) => "boolean",
		}
	}

	/// Text content with the delimiter quotes removed.
	pub fn content(&self) -> Option<&str>
	{
		match self
		{
			Value::Quoted(s) => Some(strip_quotes(s)),
			Value::Text(s) => Some(s.as_str()),
			_ => None,
		}
	}

	pub fn is_truthy(&self) -> bool
	{
		match self
		{
			Value::Number(n) => !n.is_zero(),
			Value::Bool(b) => *b,
			Value::Quoted(_) | Value::Text(_) => !self.content().unwrap_or_default().is_empty(),
		}
	}

	/// What `tuah` writes: quoted text loses its quotes, everything else prints as displayed.
	pub fn display_text(&self) -> String
	{
		match self
		{
			Value::Quoted(s) => strip_quotes(s).to_string(),
			_ => self.to_string(),
		}
	}

	/// Turns plain text back into a quoted value so it can stand in for a literal.
	pub fn requote(self) -> Value
	{
		match self
		{
			Value::Text(s) => Value::Quoted(requote(&s)),
			other => other,
		}
	}

	fn concat_part(&self) -> String
	{
		match self.content()
		{
			Some(text) => text.to_string(),
			None => self.to_string(),
		}
	}

	fn is_text(&self) -> bool
	{
		matches!(self, Value::Quoted(_) | Value::Text(_))
	}

	/// `+ - * /` on two values.
	pub fn arith(&self, op: BinaryOp, rhs: &Value) -> Result<Value, Fault>
	{
		match (self, rhs)
		{
			(Value::Number(a), Value::Number(b)) =>
			{
				if op == BinaryOp::Div && b.is_zero()
				{
					return Err(Fault::DivisionByZero);
				}
				a.arith(op, *b).map(Value::Number)
			},

			(l, r) if op == BinaryOp::Add && (l.is_text() || r.is_text()) =>
				Ok(Value::Text(format!("{}{}", l.concat_part(), r.concat_part()))),

			(l, r) => Err(Fault::UnsupportedOperands
			{
				op,
				left: l.kind(),
				right: r.kind(),
			}),
		}
	}

	/// Structural equality used by `==` and `!=`; values of different kinds are never equal.
	pub fn equals(&self, rhs: &Value) -> bool
	{
		match (self, rhs)
		{
			(Value::Number(a), Value::Number(b)) => a.compare(*b) == Some(Ordering::Equal),
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(l, r) if l.is_text() && r.is_text() => l.content() == r.content(),
			_ => false,
		}
	}

	/// Ordering used by `< > <= >=`.
	pub fn compare(&self, op: BinaryOp, rhs: &Value) -> Result<Ordering, Fault>
	{
		let ord = match (self, rhs)
		{
			(Value::Number(a), Value::Number(b)) => a.compare(*b),
			(Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
			(l, r) if l.is_text() && r.is_text() => Some(l.content().cmp(&r.content())),
			_ => None,
		};

		ord.ok_or(Fault::Incomparable
		{
			op,
			left: self.kind(),
			right: rhs.kind(),
		})
	}

	pub fn negate(&self) -> Result<Value, Fault>
	{
		match self
		{
			Value::Number(Number::Int(n)) => n
				.checked_neg()
				.map(|n| Value::Number(Number::Int(n)))
				.ok_or(Fault::NegationOverflow),
			Value::Number(Number::Float(x)) => Ok(Value::Number(Number::Float(-x))),
			other => Err(Fault::UnsupportedOperand
			{
				op: UnaryOp::Neg,
				operand: other.kind(),
			}),
		}
	}
}

impl Display for Value
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			Value::Number(n) => write!(f, "{}", n),
			Value::Quoted(s) => write!(f, "{}", s),
			Value::Text(s) => write!(f, "{}", s),
			Value::Bool(true) => write!(f, "nocap"),
			Value::Bool(false) => write!(f, "cap"),
		}
	}
}

impl From<Number> for Value
{
	fn from(n: Number) -> Self
	{
		Value::Number(n)
	}
}

impl From<i64> for Value
{
	fn from(n: i64) -> Self
	{
		Value::Number(Number::Int(n))
	}
}

impl From<f64> for Value
{
	fn from(x: f64) -> Self
	{
		Value::Number(Number::Float(x))
	}
}

impl From<bool> for Value
{
	fn from(b: bool) -> Self
	{
		Value::Bool(b)
	}
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn quoted(s: &str) -> Value
	{
		Value::Quoted(requote(s))
	}

	#[test]
	fn integer_arithmetic_stays_integral()
	{
		let a = Value::from(7);
		assert_eq!(a.arith(BinaryOp::Add, &Value::from(3)).unwrap(), Value::from(10));
		assert_eq!(a.arith(BinaryOp::Mul, &Value::from(3)).unwrap(), Value::from(21));
		assert_eq!(a.arith(BinaryOp::Div, &Value::from(2)).unwrap(), Value::from(3.5));
		assert_eq!(a.arith(BinaryOp::Sub, &Value::from(0.5)).unwrap(), Value::from(6.5));
	}

	#[test]
	fn division_by_zero_faults()
	{
		assert_eq!(Value::from(7).arith(BinaryOp::Div, &Value::from(0)), Err(Fault::DivisionByZero));
		assert_eq!(Value::from(7).arith(BinaryOp::Div, &Value::from(0.0)), Err(Fault::DivisionByZero));
	}

	#[test]
	fn overflow_faults()
	{
		let max = Value::from(i64::MAX);
		assert_eq!(max.arith(BinaryOp::Add, &Value::from(1)), Err(Fault::Overflow(BinaryOp::Add)));
		assert_eq!(Value::from(i64::MIN).negate(), Err(Fault::NegationOverflow));
	}

	#[test]
	fn concatenation_strips_quotes()
	{
		let joined = quoted("a").arith(BinaryOp::Add, &Value::from(1)).unwrap();
		assert_eq!(joined, Value::Text("a1".to_string()));
		assert_eq!(joined.to_string(), "a1");

		let joined = Value::from(2.0).arith(BinaryOp::Add, &quoted("x")).unwrap();
		assert_eq!(joined, Value::Text("2.0x".to_string()));

		let joined = quoted("skibidi ").arith(BinaryOp::Add, &quoted("toilet")).unwrap();
		assert_eq!(joined.clone().requote(), quoted("skibidi toilet"));
	}

	#[test]
	fn quotes_inside_the_delimiters_survive()
	{
		let inner = Value::Quoted("\"\"hi\"\"".to_string());
		assert_eq!(inner.display_text(), "\"hi\"");
		assert!(!inner.equals(&quoted("hi")));

		let lone = Value::Quoted("\"\"\"".to_string());
		assert_eq!(lone.display_text(), "\"");
		assert_eq!(lone.arith(BinaryOp::Add, &quoted("x")).unwrap(), Value::Text("\"x".to_string()));

		let text = Value::Text("\"edge\"".to_string());
		assert_eq!(text.content(), Some("\"edge\""));
		assert!(!text.equals(&quoted("edge")));
	}

	#[test]
	fn huge_floats_have_no_integer()
	{
		assert_eq!(Number::Float(3.0).as_integer(), Some(3));
		assert_eq!(Number::Float(1e21).as_integer(), None);
		assert_eq!(Number::Float(-1e21).as_integer(), None);
		assert_eq!(Number::Float(f64::INFINITY).as_integer(), None);
		assert_eq!(Number::Float(f64::NAN).as_integer(), None);
	}

	#[test]
	fn text_only_supports_addition()
	{
		let err = quoted("a").arith(BinaryOp::Mul, &Value::from(2)).unwrap_err();
		assert_eq!(err, Fault::UnsupportedOperands { op: BinaryOp::Mul, left: "text", right: "number" });
		assert!(Value::Bool(true).arith(BinaryOp::Add, &Value::from(1)).is_err());
	}

	#[test]
	fn truthiness()
	{
		assert!(!Value::from(0).is_truthy());
		assert!(!Value::from(0.0).is_truthy());
		assert!(!quoted("").is_truthy());
		assert!(!Value::Bool(false).is_truthy());
		assert!(Value::from(-1).is_truthy());
		assert!(quoted("cap").is_truthy());
	}

	#[test]
	fn equality_and_ordering()
	{
		assert!(Value::from(2).equals(&Value::from(2.0)));
		assert!(quoted("ab").equals(&Value::Text("ab".to_string())));
		assert!(!Value::from(1).equals(&quoted("1")));
		assert!(!Value::from(1).equals(&Value::Bool(true)));

		assert_eq!(Value::from(1).compare(BinaryOp::Lt, &Value::from(1.5)), Ok(Ordering::Less));
		assert_eq!(quoted("b").compare(BinaryOp::Gt, &quoted("a")), Ok(Ordering::Greater));
		assert!(Value::from(1).compare(BinaryOp::Lt, &quoted("a")).is_err());
	}

	#[test]
	fn display()
	{
		assert_eq!(quoted("hi").to_string(), "\"hi\"");
		assert_eq!(quoted("hi").display_text(), "hi");
		assert_eq!(Value::from(4.0).to_string(), "4.0");
		assert_eq!(Value::Bool(true).to_string(), "nocap");
		assert_eq!(Value::Bool(false).display_text(), "cap");
	}
}
