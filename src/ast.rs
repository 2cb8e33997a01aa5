use std::fmt::{self, Display};

use super::value::Number;

/// Ordered statements of a program or of a `{ ... }` block.
pub type Block = Vec<Stmt>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp
{
	Neg,
	Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp
{
	Add,
	Sub,
	Mul,
	Div,
	Eq,
	Ne,
	Lt,
	Gt,
	Le,
	Ge,
	And,
	Or,
}

impl Display for UnaryOp
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			UnaryOp::Neg => write!(f, "-"),
			UnaryOp::Not => write!(f, "not"),
		}
	}
}

impl Display for BinaryOp
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		let symbol = match self
		{
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Div => "/",
			BinaryOp::Eq  => "==",
			BinaryOp::Ne  => "!=",
			BinaryOp::Lt  => "<",
			BinaryOp::Gt  => ">",
			BinaryOp::Le  => "<=",
			BinaryOp::Ge  => ">=",
			BinaryOp::And => "and",
			BinaryOp::Or  => "or",
		};
		write!(f, "{}", symbol)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr
{
	Number(Number),
	/// String literal, delimiter quotes included.
	Str(String),
	Bool(bool),
	Var(String),
	Unary(UnaryOp, Box<Expr>),
	Binary(BinaryOp, Box<Expr>, Box<Expr>),
	/// `hawk()` with an optional prompt literal.
	Input(Option<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElifClause
{
	pub condition: Expr,
	pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt
{
	Expr(Expr),
	Assign(String, Expr),
	Print(Expr),
	If
	{
		condition: Expr,
		then: Block,
		elifs: Vec<ElifClause>,
		otherwise: Option<Block>,
	},
	Loop
	{
		var: String,
		count: Expr,
		body: Block,
	},
	Return(Expr),
}

impl Expr
{
	pub fn unary(op: UnaryOp, operand: Expr) -> Expr
	{
		Expr::Unary(op, Box::new(operand))
	}

	pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr
	{
		Expr::Binary(op, Box::new(left), Box::new(right))
	}
}

/// Renders expressions fully parenthesized, which makes grouping visible in logs and tests.
impl Display for Expr
{
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			Expr::Number(n) => write!(f, "{}", n),
			Expr::Str(s) => write!(f, "{}", s),
			Expr::Bool(b) => write!(f, "{}", if *b { "nocap" } else { "cap" }),
			Expr::Var(name) => write!(f, "{}", name),
			Expr::Unary(UnaryOp::Neg, operand) => write!(f, "(-{})", operand),
			Expr::Unary(UnaryOp::Not, operand) => write!(f, "(not {})", operand),
			Expr::Binary(op, left, right) => write!(f, "({} {} {})", left, op, right),
			Expr::Input(Some(prompt)) => write!(f, "hawk({})", prompt),
			Expr::Input(None) => write!(f, "hawk()"),
		}
	}
}
