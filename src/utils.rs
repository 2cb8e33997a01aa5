use super::value::Number;

pub const QUOTE: char = '"';

/// Removes one delimiter quote from each end. Quotes inside the delimiters are content.
pub fn strip_quotes(text: &str) -> &str
{
	text.strip_prefix(QUOTE)
		.and_then(|inner| inner.strip_suffix(QUOTE))
		.unwrap_or(text)
}

pub fn requote(text: &str) -> String
{
	format!("{}{}{}", QUOTE, text, QUOTE)
}

/// Decodes backslash escapes in the body of a string literal.
/// Unknown escapes stand for the escaped character itself.
pub fn decode_escapes(body: &str) -> String
{
	let mut ret = String::with_capacity(body.len());
	let mut chars = body.chars();

	while let Some(c) = chars.next()
	{
		if c != '\\'
		{
			ret.push(c);
			continue;
		}

		match chars.next()
		{
			Some('n')   => ret.push('\n'),
			Some('t')   => ret.push('\t'),
			Some('r')   => ret.push('\r'),
			Some('0')   => ret.push('\0'),
			Some(other) => ret.push(other),
			None        => ret.push('\\'),
		}
	}

	ret
}

/// Reads the digits matched for a number literal. Unlike `parse_number` an
/// integer literal never falls back to a float; out of range is `None`.
pub fn parse_literal(digits: &str) -> Option<Number>
{
	if digits.contains('.')
	{
		digits.parse::<f64>().ok().map(Number::Float)
	}
	else
	{
		digits.parse::<i64>().ok().map(Number::Int)
	}
}

/// Interprets user supplied text as a number: integer first, then float.
pub fn parse_number(text: &str) -> Option<Number>
{
	let text = text.trim();
	if text.is_empty()
	{
		return None;
	}

	if let Ok(n) = text.parse::<i64>()
	{
		return Some(Number::Int(n));
	}

	text.parse::<f64>().ok().map(Number::Float)
}

pub fn format_float(x: f64) -> String
{
	if x.is_finite() && x.fract() == 0.0
	{
		format!("{:.1}", x)
	}
	else
	{
		format!("{}", x)
	}
}
