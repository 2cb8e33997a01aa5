use std::fmt::{self, Display};

use log::trace;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use super::utils::*;
use super::value::Number;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(||
{
	let reg_str = concat!(
		r"\A(?:",
		r"(?P<ws>[ \t\r]+)",
		r"|(?P<comment>#[^\n]*)",
		r"|(?P<newline>\n(?:[ \t\r]*\n)*)",
		r"|(?P<number>[0-9]+(?:\.[0-9]*)?)",
		r#"|(?P<string>"(?:[^"\\\n]|\\(?s:.))*")"#,
		r"|(?P<word>[A-Za-z_][A-Za-z0-9_]*)",
		r"|(?P<op>==|!=|<=|>=|[-+*/<>=(){},])",
		r")",
	);
	Regex::new(reg_str).expect("token pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind
{
	Number(Number),
	/// Decoded string literal, delimiter quotes kept.
	Str(String),
	Name(String),

	Print,
	Input,
	If,
	Elif,
	Else,
	For,
	In,
	Return,
	True,
	False,
	And,
	Or,
	Not,

	Plus,
	Minus,
	Star,
	Slash,
	EqEq,
	NotEq,
	Lt,
	Gt,
	Le,
	Ge,
	Assign,
	LParen,
	RParen,
	LBrace,
	RBrace,
	Comma,
	Newline,
}

impl TokenKind
{
	/// Reserved words, brainrot spelling first, plain alias second.
	pub fn keyword(word: &str) -> Option<TokenKind>
	{
		Some(match word
		{
			"tuah"   | "print"  => TokenKind::Print,
			"hawk"   | "input"  => TokenKind::Input,
			"goon"   | "if"     => TokenKind::If,
			"lowkey" | "elif"   => TokenKind::Elif,
			"edge"   | "else"   => TokenKind::Else,
			"frfr"   | "for"    => TokenKind::For,
			"vibing" | "in"     => TokenKind::In,
			"yeet"   | "return" => TokenKind::Return,
			"nocap"  | "true"   => TokenKind::True,
			"cap"    | "false"  => TokenKind::False,
			"and" => TokenKind::And,
			"or"  => TokenKind::Or,
			"not" => TokenKind::Not,
			_ => return None,
		})
	}

	fn operator(op: &str) -> Option<TokenKind>
	{
		Some(match op
		{
			"+"  => TokenKind::Plus,
			"-"  => TokenKind::Minus,
			"*"  => TokenKind::Star,
			"/"  => TokenKind::Slash,
			"==" => TokenKind::EqEq,
			"!=" => TokenKind::NotEq,
			"<"  => TokenKind::Lt,
			">"  => TokenKind::Gt,
			"<=" => TokenKind::Le,
			">=" => TokenKind::Ge,
			"="  => TokenKind::Assign,
			"("  => TokenKind::LParen,
			")"  => TokenKind::RParen,
			"{"  => TokenKind::LBrace,
			"}"  => TokenKind::RBrace,
			","  => TokenKind::Comma,
			_ => return None,
		})
	}
}

impl Display for TokenKind
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			TokenKind::Number(n) => write!(f, "number {}", n),
			TokenKind::Str(s) => write!(f, "string {}", s),
			TokenKind::Name(name) => write!(f, "name '{}'", name),
			TokenKind::Newline => write!(f, "newline"),
			other => write!(f, "'{}'", other.spelling()),
		}
	}
}

impl TokenKind
{
	fn spelling(&self) -> &'static str
	{
		match self
		{
			TokenKind::Print  => "tuah",
			TokenKind::Input  => "hawk",
			TokenKind::If     => "goon",
			TokenKind::Elif   => "lowkey",
			TokenKind::Else   => "edge",
			TokenKind::For    => "frfr",
			TokenKind::In     => "vibing",
			TokenKind::Return => "yeet",
			TokenKind::True   => "nocap",
			TokenKind::False  => "cap",
			TokenKind::And    => "and",
			TokenKind::Or     => "or",
			TokenKind::Not    => "not",
			TokenKind::Plus   => "+",
			TokenKind::Minus  => "-",
			TokenKind::Star   => "*",
			TokenKind::Slash  => "/",
			TokenKind::EqEq   => "==",
			TokenKind::NotEq  => "!=",
			TokenKind::Lt     => "<",
			TokenKind::Gt     => ">",
			TokenKind::Le     => "<=",
			TokenKind::Ge     => ">=",
			TokenKind::Assign => "=",
			TokenKind::LParen => "(",
			TokenKind::RParen => ")",
			TokenKind::LBrace => "{",
			TokenKind::RBrace => "}",
			TokenKind::Comma  => ",",
			TokenKind::Number(_) | TokenKind::Str(_) | TokenKind::Name(_) | TokenKind::Newline => "",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token
{
	pub kind: TokenKind,
	pub lexeme: String,
	pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError
{
	#[error("Brainrot error at line {line}: Illegal char '{ch}'")]
	IllegalChar
	{
		ch: char,
		line: usize,
	},
	/// Integer literal that does not fit in 64 bits. The whole literal is skipped.
	#[error("Brainrot error at line {line}: Number too large '{literal}'")]
	NumberTooLarge
	{
		literal: String,
		line: usize,
	},
}

/// Lazy token stream over one source buffer.
///
/// An unrecognized character yields one `LexError` and is skipped; the stream
/// then carries on with the next character. An oversized integer literal is
/// reported and skipped as a whole.
pub struct Tokenizer<'a>
{
	src: &'a str,
	pos: usize,
	line: usize,
}

pub fn tokenize(src: &str) -> Tokenizer<'_>
{
	Tokenizer
	{
		src,
		pos: 0,
		line: 1,
	}
}

impl<'a> Tokenizer<'a>
{
	fn classify(&self, cap: &Captures) -> Option<TokenKind>
	{
		if let Some(m) = cap.name("number")
		{
			return parse_literal(m.as_str()).map(TokenKind::Number);
		}

		if let Some(m) = cap.name("string")
		{
			let lexeme = m.as_str();
			let body = &lexeme[1..lexeme.len() - 1];
			return Some(TokenKind::Str(requote(&decode_escapes(body))));
		}

		if let Some(m) = cap.name("word")
		{
			let word = m.as_str();
			return Some(TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Name(word.to_string())));
		}

		cap.name("op").and_then(|m| TokenKind::operator(m.as_str()))
	}

	fn illegal(&mut self) -> LexError
	{
		let ch = self.src[self.pos..].chars().next().unwrap_or_default();
		self.pos += ch.len_utf8().max(1);
		trace!("illegal char {:?} at line {}", ch, self.line);
		LexError::IllegalChar { ch, line: self.line }
	}
}

impl<'a> Iterator for Tokenizer<'a>
{
	type Item = Result<Token, LexError>;

	fn next(&mut self) -> Option<Self::Item>
	{
		while self.pos < self.src.len()
		{
			let rest = &self.src[self.pos..];
			let cap = match TOKEN_PATTERN.captures(rest)
			{
				Some(cap) => cap,
				None => return Some(Err(self.illegal())),
			};

			let lexeme = &rest[..cap[0].len()];
			if cap.name("ws").is_some() || cap.name("comment").is_some()
			{
				self.pos += lexeme.len();
				continue;
			}

			let line = self.line;
			let kind = if cap.name("newline").is_some()
			{
				Some(TokenKind::Newline)
			}
			else
			{
				self.classify(&cap)
			};

			let kind = match kind
			{
				Some(kind) => kind,
				None if cap.name("number").is_some() =>
				{
					self.pos += lexeme.len();
					trace!("number literal {} out of range at line {}", lexeme, line);
					return Some(Err(LexError::NumberTooLarge { literal: lexeme.to_string(), line }));
				},
				None => return Some(Err(self.illegal())),
			};

			self.pos += lexeme.len();
			self.line += lexeme.matches('\n').count();

			return Some(Ok(Token
			{
				kind,
				lexeme: lexeme.to_string(),
				line,
			}));
		}

		None
	}
}
