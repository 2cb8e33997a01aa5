use log::trace;
use thiserror::Error;

use super::ast::*;
use super::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError
{
	#[error("Syntax error at line {line}: unexpected {found}")]
	Unexpected
	{
		found: String,
		line: usize,
	},
	#[error("Syntax error at line {line}: nesting too deep")]
	TooDeep
	{
		line: usize,
	},
}

pub type ParseResult<T> = Result<T, SyntaxError>;

/// How far expressions and blocks may nest. Evaluation recurses over the same
/// tree, so this also bounds the interpreter's stack use.
pub const MAX_DEPTH: usize = 200;

/// Binding power of binary operators, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
enum Precedence
{
	Lowest,
	Or,          // or
	And,         // and
	Equals,      // == !=
	LessGreater, // < > <= >=
	Sum,         // + -
	Product,     // * /
	Prefix,      // -x, not x
}

impl From<&TokenKind> for Precedence
{
	fn from(kind: &TokenKind) -> Self
	{
		use TokenKind::*;
		match kind
		{
			Or => Self::Or,
			And => Self::And,
			EqEq | NotEq => Self::Equals,
			Lt | Gt | Le | Ge => Self::LessGreater,
			Plus | Minus => Self::Sum,
			Star | Slash => Self::Product,
			_ => Self::Lowest,
		}
	}
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp>
{
	Some(match kind
	{
		TokenKind::Plus  => BinaryOp::Add,
		TokenKind::Minus => BinaryOp::Sub,
		TokenKind::Star  => BinaryOp::Mul,
		TokenKind::Slash => BinaryOp::Div,
		TokenKind::EqEq  => BinaryOp::Eq,
		TokenKind::NotEq => BinaryOp::Ne,
		TokenKind::Lt    => BinaryOp::Lt,
		TokenKind::Gt    => BinaryOp::Gt,
		TokenKind::Le    => BinaryOp::Le,
		TokenKind::Ge    => BinaryOp::Ge,
		TokenKind::And   => BinaryOp::And,
		TokenKind::Or    => BinaryOp::Or,
		_ => return None,
	})
}

struct Parser
{
	tokens: Vec<Token>,
	i: usize,
	depth: usize,
}

pub fn parse(tokens: Vec<Token>) -> ParseResult<Block>
{
	let mut parser = Parser { tokens, i: 0, depth: 0 };
	let program = parser.parse_program()?;
	trace!("parsed {} top-level statements", program.len());
	Ok(program)
}

impl Parser
{
	fn peek(&self) -> Option<&TokenKind>
	{
		self.tokens.get(self.i).map(|t| &t.kind)
	}

	/// First token after any run of newlines, without consuming anything.
	fn peek_past_newlines(&self) -> Option<&TokenKind>
	{
		self.tokens[self.i..]
			.iter()
			.map(|t| &t.kind)
			.find(|kind| **kind != TokenKind::Newline)
	}

	fn at(&self, kind: &TokenKind) -> bool
	{
		self.peek() == Some(kind)
	}

	fn skip_newlines(&mut self)
	{
		while self.at(&TokenKind::Newline)
		{
			self.i += 1;
		}
	}

	fn line(&self) -> usize
	{
		self.tokens
			.get(self.i)
			.or_else(|| self.tokens.last())
			.map_or(1, |t| t.line)
	}

	fn unexpected(&self) -> SyntaxError
	{
		let found = match self.tokens.get(self.i)
		{
			Some(tok) => tok.kind.to_string(),
			None => "end of input".to_string(),
		};
		SyntaxError::Unexpected { found, line: self.line() }
	}

	/// Runs `f` one nesting level deeper.
	fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T>
	{
		if self.depth >= MAX_DEPTH
		{
			trace!("nesting limit hit at line {}", self.line());
			return Err(SyntaxError::TooDeep { line: self.line() });
		}

		self.depth += 1;
		let ret = f(self);
		self.depth -= 1;
		ret
	}

	fn expect(&mut self, kind: TokenKind) -> ParseResult<()>
	{
		if self.at(&kind)
		{
			self.i += 1;
			Ok(())
		}
		else
		{
			Err(self.unexpected())
		}
	}

	fn expect_name(&mut self) -> ParseResult<String>
	{
		match self.peek()
		{
			Some(TokenKind::Name(name)) =>
			{
				let name = name.clone();
				self.i += 1;
				Ok(name)
			},
			_ => Err(self.unexpected()),
		}
	}

	fn parse_program(&mut self) -> ParseResult<Block>
	{
		self.parse_statements(None)
	}

	fn parse_block(&mut self) -> ParseResult<Block>
	{
		self.expect(TokenKind::LBrace)?;
		let block = self.nested(|p| p.parse_statements(Some(TokenKind::RBrace)))?;
		self.expect(TokenKind::RBrace)?;
		Ok(block)
	}

	/// Statements separated by newlines, up to `close` (left unconsumed) or end of input.
	fn parse_statements(&mut self, close: Option<TokenKind>) -> ParseResult<Block>
	{
		let mut block = vec![];

		loop
		{
			self.skip_newlines();
			match (self.peek(), &close)
			{
				(None, None) => return Ok(block),
				(None, Some(_)) => return Err(self.unexpected()),
				(Some(kind), Some(close)) if kind == close => return Ok(block),
				_ => (),
			}

			block.push(self.parse_stmt()?);

			match (self.peek(), &close)
			{
				(None, _) | (Some(TokenKind::Newline), _) => (),
				(Some(kind), Some(close)) if kind == close => (),
				_ => return Err(self.unexpected()),
			}
		}
	}

	fn parse_stmt(&mut self) -> ParseResult<Stmt>
	{
		match self.peek()
		{
			Some(TokenKind::Print) =>
			{
				self.i += 1;
				self.expect(TokenKind::LParen)?;
				self.skip_newlines();
				let expr = self.parse_expr(Precedence::Lowest)?;
				self.skip_newlines();
				self.expect(TokenKind::RParen)?;
				Ok(Stmt::Print(expr))
			},

			Some(TokenKind::If) => self.parse_if(),
			Some(TokenKind::For) => self.parse_loop(),

			Some(TokenKind::Return) =>
			{
				self.i += 1;
				Ok(Stmt::Return(self.parse_expr(Precedence::Lowest)?))
			},

			Some(TokenKind::Name(_)) if self.tokens.get(self.i + 1).map(|t| &t.kind) == Some(&TokenKind::Assign) =>
			{
				let name = self.expect_name()?;
				self.i += 1;
				Ok(Stmt::Assign(name, self.parse_expr(Precedence::Lowest)?))
			},

			_ => Ok(Stmt::Expr(self.parse_expr(Precedence::Lowest)?)),
		}
	}

	fn parse_if(&mut self) -> ParseResult<Stmt>
	{
		self.expect(TokenKind::If)?;
		let condition = self.parse_expr(Precedence::Lowest)?;
		let then = self.parse_block()?;

		let mut elifs = vec![];
		while self.peek_past_newlines() == Some(&TokenKind::Elif)
		{
			self.skip_newlines();
			self.i += 1;
			let condition = self.parse_expr(Precedence::Lowest)?;
			let body = self.parse_block()?;
			elifs.push(ElifClause { condition, body });
		}

		let mut otherwise = None;
		if self.peek_past_newlines() == Some(&TokenKind::Else)
		{
			self.skip_newlines();
			self.i += 1;
			otherwise = Some(self.parse_block()?);
		}

		Ok(Stmt::If { condition, then, elifs, otherwise })
	}

	fn parse_loop(&mut self) -> ParseResult<Stmt>
	{
		self.expect(TokenKind::For)?;
		let var = self.expect_name()?;
		self.expect(TokenKind::In)?;
		let count = self.parse_expr(Precedence::Lowest)?;
		let body = self.parse_block()?;
		Ok(Stmt::Loop { var, count, body })
	}

	fn parse_expr(&mut self, precedence: Precedence) -> ParseResult<Expr>
	{
		self.nested(|p| p.parse_binary(precedence))
	}

	fn parse_binary(&mut self, precedence: Precedence) -> ParseResult<Expr>
	{
		let mut left = self.parse_prefix()?;
		// A left-associative chain deepens the tree without recursing here.
		let mut height = self.depth;

		loop
		{
			let (op, next) = match self.peek()
			{
				Some(kind) => match binary_op(kind)
				{
					Some(op) => (op, Precedence::from(kind)),
					None => break,
				},
				None => break,
			};

			if next <= precedence
			{
				break;
			}

			height += 1;
			if height > MAX_DEPTH
			{
				return Err(SyntaxError::TooDeep { line: self.line() });
			}

			self.i += 1;
			self.skip_newlines();
			let right = self.parse_expr(next)?;
			left = Expr::binary(op, left, right);
		}

		Ok(left)
	}

	fn parse_prefix(&mut self) -> ParseResult<Expr>
	{
		let op = match self.peek()
		{
			Some(TokenKind::Minus) => UnaryOp::Neg,
			Some(TokenKind::Not) => UnaryOp::Not,
			_ => return self.parse_primary(),
		};

		self.i += 1;
		let operand = self.parse_expr(Precedence::Prefix)?;
		Ok(Expr::unary(op, operand))
	}

	fn parse_primary(&mut self) -> ParseResult<Expr>
	{
		let kind = match self.peek()
		{
			Some(kind) => kind.clone(),
			None => return Err(self.unexpected()),
		};

		let expr = match kind
		{
			TokenKind::LParen => return self.parse_group(),
			TokenKind::Input => return self.parse_input(),

			TokenKind::Number(n) => Expr::Number(n),
			TokenKind::Str(s) => Expr::Str(s),
			TokenKind::True => Expr::Bool(true),
			TokenKind::False => Expr::Bool(false),
			TokenKind::Name(name) => Expr::Var(name),
			_ => return Err(self.unexpected()),
		};

		self.i += 1;
		Ok(expr)
	}

	fn parse_group(&mut self) -> ParseResult<Expr>
	{
		self.expect(TokenKind::LParen)?;
		self.skip_newlines();
		let expr = self.parse_expr(Precedence::Lowest)?;
		self.skip_newlines();
		self.expect(TokenKind::RParen)?;
		Ok(expr)
	}

	/// `hawk()` or `hawk("prompt")`.
	fn parse_input(&mut self) -> ParseResult<Expr>
	{
		self.expect(TokenKind::Input)?;
		self.expect(TokenKind::LParen)?;

		let mut prompt = None;
		if let Some(TokenKind::Str(s)) = self.peek()
		{
			prompt = Some(s.clone());
			self.i += 1;
		}

		self.expect(TokenKind::RParen)?;
		Ok(Expr::Input(prompt))
	}
}
