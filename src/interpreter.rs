use std::cmp::Ordering;

use log::{debug, trace};
use thiserror::Error;

use super::ast::*;
use super::environment::Environment;
use super::utils::*;
use super::value::Value;

/// Runtime fault. The statement that raised it is abandoned; the program goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault
{
	#[error("division by zero")]
	DivisionByZero,

	#[error("integer overflow in '{0}'")]
	Overflow(BinaryOp),

	#[error("integer overflow in negation")]
	NegationOverflow,

	#[error("unsupported operand types for '{op}': {left} and {right}")]
	UnsupportedOperands
	{
		op: BinaryOp,
		left: &'static str,
		right: &'static str,
	},

	#[error("bad operand type for unary '{op}': {operand}")]
	UnsupportedOperand
	{
		op: UnaryOp,
		operand: &'static str,
	},

	#[error("'{op}' not supported between {left} and {right}")]
	Incomparable
	{
		op: BinaryOp,
		left: &'static str,
		right: &'static str,
	},

	#[error("loop count must be an integer, got {0}")]
	BadLoopCount(String),

	#[error("undefined variable '{0}'")]
	UndefinedVariable(String),
}

/// The console went away (interrupt or end of input) while the program waited on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted")]
pub struct Interrupted;

/// Side effects a running program can have on the outside world.
pub trait Effects
{
	fn write_output(&mut self, text: &str);

	/// Blocks until the user answers. The answer carries no trailing newline.
	fn request_input(&mut self, prompt: &str) -> Result<String, Interrupted>;

	fn report_fault(&mut self, fault: &Fault)
	{
		self.write_output(&format!("Runtime error: {}", fault));
	}
}

#[derive(Debug, Clone)]
pub struct Options
{
	/// Reading an unassigned variable is a fault instead of zero.
	pub strict: bool,
	pub input_prompt: String,
}

impl Default for Options
{
	fn default() -> Self
	{
		Self
		{
			strict: false,
			input_prompt: "BRAINROT>> ".to_string(),
		}
	}
}

/// What one program run produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome
{
	/// Values of expression statements, in execution order.
	pub results: Vec<Value>,
	/// Value of the `yeet` that ended the program, if one did.
	pub cut: Option<Value>,
	pub faults: Vec<Fault>,
}

impl Outcome
{
	/// The result worth showing: the cut value, else the first statement result.
	pub fn headline(&self) -> Option<&Value>
	{
		self.cut.as_ref().or_else(|| self.results.first())
	}
}

enum Flow
{
	Next,
	Cut(Value),
}

enum Stop
{
	Fault(Fault),
	Interrupted,
}

impl From<Fault> for Stop
{
	fn from(fault: Fault) -> Self
	{
		Stop::Fault(fault)
	}
}

impl From<Interrupted> for Stop
{
	fn from(_: Interrupted) -> Self
	{
		Stop::Interrupted
	}
}

struct Evaluator<'a>
{
	env: &'a mut Environment,
	effects: &'a mut dyn Effects,
	options: &'a Options,
	faults: Vec<Fault>,
}

/// Runs `program` against `env`.
///
/// Faults are reported through `effects` as they happen and never end the run.
/// `Err(Interrupted)` means the console disappeared during an input request;
/// whatever ran before that has already changed `env`.
pub fn evaluate(program: &Block, env: &mut Environment, effects: &mut dyn Effects, options: &Options) -> Result<Outcome, Interrupted>
{
	debug!("evaluating {} statements", program.len());

	let mut ev = Evaluator
	{
		env,
		effects,
		options,
		faults: vec![],
	};

	let mut results = vec![];
	let cut = match ev.exec_block(program, &mut results)?
	{
		Flow::Cut(value) => Some(value),
		Flow::Next => None,
	};

	Ok(Outcome
	{
		results,
		cut,
		faults: ev.faults,
	})
}

impl<'a> Evaluator<'a>
{
	fn report(&mut self, fault: Fault)
	{
		debug!("runtime fault: {}", fault);
		self.effects.report_fault(&fault);
		self.faults.push(fault);
	}

	fn exec_block(&mut self, block: &Block, results: &mut Vec<Value>) -> Result<Flow, Interrupted>
	{
		for stmt in block
		{
			match self.exec(stmt, results)
			{
				Ok(Flow::Next) => (),
				Ok(cut) => return Ok(cut),
				Err(Stop::Fault(fault)) => self.report(fault),
				Err(Stop::Interrupted) => return Err(Interrupted),
			}
		}

		Ok(Flow::Next)
	}

	fn exec(&mut self, stmt: &Stmt, results: &mut Vec<Value>) -> Result<Flow, Stop>
	{
		match stmt
		{
			Stmt::Expr(expr) =>
			{
				let value = self.eval(expr)?;
				results.push(value);
			},

			Stmt::Assign(name, expr) =>
			{
				let value = self.eval(expr)?;
				trace!("{} = {}", name, value);
				self.env.set(name.as_str(), value);
			},

			Stmt::Print(expr) =>
			{
				let value = self.eval(expr)?;
				self.effects.write_output(&value.display_text());
			},

			Stmt::If { condition, then, elifs, otherwise } =>
			{
				let branch = if self.eval(condition)?.is_truthy()
				{
					Some(then)
				}
				else
				{
					self.select_elif(elifs)?.or(otherwise.as_ref())
				};

				if let Some(block) = branch
				{
					return Ok(self.exec_block(block, results)?);
				}
			},

			Stmt::Loop { var, count, body } =>
			{
				let n = self.loop_count(count)?;
				for i in 0..n
				{
					self.env.set(var.as_str(), Value::from(i));
					if let Flow::Cut(value) = self.exec_block(body, results)?
					{
						return Ok(Flow::Cut(value));
					}
				}
			},

			Stmt::Return(expr) => return Ok(Flow::Cut(self.eval(expr)?)),
		}

		Ok(Flow::Next)
	}

	/// First `elif` whose condition holds; conditions after it are not evaluated.
	fn select_elif<'b>(&mut self, elifs: &'b [ElifClause]) -> Result<Option<&'b Block>, Stop>
	{
		for clause in elifs
		{
			if self.eval(&clause.condition)?.is_truthy()
			{
				return Ok(Some(&clause.body));
			}
		}

		Ok(None)
	}

	fn loop_count(&mut self, count: &Expr) -> Result<i64, Stop>
	{
		let value = self.eval(count)?;
		let n = match &value
		{
			Value::Number(n) => n.as_integer(),
			_ => None,
		};

		n.ok_or_else(|| Fault::BadLoopCount(value.to_string()).into())
	}

	fn eval(&mut self, expr: &Expr) -> Result<Value, Stop>
	{
		Ok(match expr
		{
			Expr::Number(n) => Value::Number(*n),
			Expr::Str(s) => Value::Quoted(s.clone()),
			Expr::Bool(b) => Value::Bool(*b),
			Expr::Var(name) => self.lookup(name)?,

			Expr::Unary(op, operand) =>
			{
				let value = self.eval(operand)?;
				match op
				{
					UnaryOp::Neg => value.negate()?,
					UnaryOp::Not => Value::Bool(!value.is_truthy()),
				}
			},

			// Both sides are always evaluated, `and`/`or` included.
			Expr::Binary(op, left, right) =>
			{
				let left = self.eval(left)?;
				let right = self.eval(right)?;
				apply(*op, &left, &right)?
			},

			Expr::Input(prompt) => self.input(prompt.as_deref())?,
		})
	}

	fn lookup(&self, name: &str) -> Result<Value, Fault>
	{
		if self.options.strict && self.env.lookup(name).is_none()
		{
			return Err(Fault::UndefinedVariable(name.to_string()));
		}

		Ok(self.env.get(name))
	}

	fn input(&mut self, prompt: Option<&str>) -> Result<Value, Stop>
	{
		let prompt = prompt.map_or(self.options.input_prompt.as_str(), strip_quotes);
		let answer = self.effects.request_input(prompt)?;
		let answer = answer.trim_end_matches(|c| c == '\n' || c == '\r');

		Ok(match parse_number(answer)
		{
			Some(n) => Value::Number(n),
			None => Value::Text(answer.to_string()).requote(),
		})
	}
}

fn apply(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, Fault>
{
	Ok(match op
	{
		BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => left.arith(op, right)?,
		BinaryOp::Eq => Value::Bool(left.equals(right)),
		BinaryOp::Ne => Value::Bool(!left.equals(right)),
		BinaryOp::Lt => Value::Bool(left.compare(op, right)? == Ordering::Less),
		BinaryOp::Gt => Value::Bool(left.compare(op, right)? == Ordering::Greater),
		BinaryOp::Le => Value::Bool(left.compare(op, right)? != Ordering::Greater),
		BinaryOp::Ge => Value::Bool(left.compare(op, right)? != Ordering::Less),
		BinaryOp::And => Value::Bool(left.is_truthy() && right.is_truthy()),
		BinaryOp::Or => Value::Bool(left.is_truthy() || right.is_truthy()),
	})
}

#[cfg(test)]
mod tests
{
	use std::collections::VecDeque;

	use super::*;
	use crate::lexer::tokenize;
	use crate::parser::parse;
	use pretty_assertions::assert_eq;

	#[derive(Default)]
	struct Recorder
	{
		output: Vec<String>,
		answers: VecDeque<String>,
		prompts: Vec<String>,
	}

	impl Effects for Recorder
	{
		fn write_output(&mut self, text: &str)
		{
			self.output.push(text.to_string());
		}

		fn request_input(&mut self, prompt: &str) -> Result<String, Interrupted>
		{
			self.prompts.push(prompt.to_string());
			self.answers.pop_front().ok_or(Interrupted)
		}
	}

	fn run_with(src: &str, env: &mut Environment, rec: &mut Recorder, options: &Options) -> Result<Outcome, Interrupted>
	{
		let program = parse(tokenize(src).map(|t| t.unwrap()).collect()).unwrap();
		evaluate(&program, env, rec, options)
	}

	fn run(src: &str) -> (Outcome, Environment, Vec<String>)
	{
		let mut env = Environment::new();
		let mut rec = Recorder::default();
		let outcome = run_with(src, &mut env, &mut rec, &Options::default()).unwrap();
		(outcome, env, rec.output)
	}

	#[test]
	fn precedence()
	{
		assert_eq!(run("2 + 3 * 4").0.headline(), Some(&Value::from(14)));
		assert_eq!(run("(2 + 3) * 4").0.headline(), Some(&Value::from(20)));
		assert_eq!(run("10 - 4 - 3").0.headline(), Some(&Value::from(3)));
		assert_eq!(run("-2 * -3").0.headline(), Some(&Value::from(6)));
	}

	#[test]
	fn comparisons_and_logic()
	{
		let (outcome, _, _) = run("1 < 2\n2 <= 1\n3 >= 3\n\"b\" > \"a\"\n1 == 1.0\n1 != \"1\"\nnot 0\n1 and 0\n0 or \"x\"");
		let expected: Vec<Value> = [true, false, true, true, true, true, true, false, true]
			.into_iter()
			.map(Value::Bool)
			.collect();
		assert_eq!(outcome.results, expected);
	}

	#[test]
	fn division_by_zero_is_reported_and_run_continues()
	{
		let (outcome, env, output) = run("x = 7 / 0\ny = 1\ntuah(y)");
		assert_eq!(outcome.faults, vec![Fault::DivisionByZero]);
		assert_eq!(output, vec!["Runtime error: division by zero".to_string(), "1".to_string()]);
		assert!(env.lookup("x").is_none());
		assert_eq!(env.get("y"), Value::from(1));
	}

	#[test]
	fn mixed_addition_concatenates()
	{
		let (outcome, env, output) = run("s = \"a\" + 1\ntuah(s)\ntuah(\"hi\")\ns");
		assert_eq!(env.get("s"), Value::Text("a1".to_string()));
		assert_eq!(output, vec!["a1".to_string(), "hi".to_string()]);
		assert_eq!(outcome.headline().map(Value::to_string), Some("a1".to_string()));
	}

	#[test]
	fn quoted_headline_keeps_quotes()
	{
		let (outcome, _, _) = run("\"rizz\"");
		assert_eq!(outcome.headline().map(Value::to_string), Some("\"rizz\"".to_string()));
	}

	#[test]
	fn conditional_chain_runs_one_branch()
	{
		assert_eq!(run("if (0) {x=1} elif (1) {x=2} else {x=3}").1.get("x"), Value::from(2));
		assert_eq!(run("if (1) {x=1} elif (1) {x=2} else {x=3}").1.get("x"), Value::from(1));
		assert_eq!(run("if (0) {x=1} elif (0) {x=2} else {x=3}").1.get("x"), Value::from(3));
		assert!(run("goon cap {x=1} lowkey \"\" {x=2}").1.lookup("x").is_none());
	}

	#[test]
	fn counting_loop_binds_zero_to_n_minus_one()
	{
		let (_, env, output) = run("frfr i vibing 3 {\n tuah(i)\n}");
		assert_eq!(output, vec!["0", "1", "2"]);
		assert_eq!(env.get("i"), Value::from(2));
	}

	#[test]
	fn loop_results_and_bad_counts()
	{
		let (outcome, env, _) = run("frfr i vibing 2.0 {\n i * 10\n}\nfrfr j vibing -1 { j }");
		assert_eq!(outcome.results, vec![Value::from(0), Value::from(10)]);
		assert!(env.lookup("j").is_none());

		let (outcome, _, _) = run("frfr i vibing \"3\" { i }");
		assert_eq!(outcome.faults, vec![Fault::BadLoopCount("\"3\"".to_string())]);
	}

	#[test]
	fn loop_count_beyond_integer_range_faults()
	{
		let (outcome, env, _) = run("frfr i vibing 1000000000000000000000.0 { }\ntuah(1)");
		assert_eq!(outcome.faults, vec![Fault::BadLoopCount("1000000000000000000000.0".to_string())]);
		assert!(env.lookup("i").is_none());
	}

	#[test]
	fn undefined_variable_reads_zero()
	{
		assert_eq!(run("ghost + 1").0.headline(), Some(&Value::from(1)));
	}

	#[test]
	fn strict_mode_faults_on_undefined()
	{
		let mut env = Environment::new();
		let mut rec = Recorder::default();
		let options = Options { strict: true, ..Options::default() };
		let outcome = run_with("x = ghost\ny = 2", &mut env, &mut rec, &options).unwrap();
		assert_eq!(outcome.faults, vec![Fault::UndefinedVariable("ghost".to_string())]);
		assert_eq!(rec.output, vec!["Runtime error: undefined variable 'ghost'"]);
		assert_eq!(env.get("y"), Value::from(2));
	}

	#[test]
	fn cut_ends_the_program()
	{
		let (outcome, env, output) = run("1\ngoon 1 {\n frfr i vibing 10 {\n goon i == 3 { yeet i * 2 }\n }\n}\ntuah(\"unreachable\")\nz = 1");
		assert_eq!(outcome.cut, Some(Value::from(6)));
		assert_eq!(outcome.headline(), Some(&Value::from(6)));
		assert_eq!(outcome.results, vec![Value::from(1)]);
		assert!(output.is_empty());
		assert_eq!(env.get("i"), Value::from(3));
		assert!(env.lookup("z").is_none());
	}

	#[test]
	fn logical_operators_evaluate_both_sides()
	{
		let mut env = Environment::new();
		let mut rec = Recorder { answers: VecDeque::from(vec!["5".to_string()]), ..Recorder::default() };
		let outcome = run_with("0 and hawk()", &mut env, &mut rec, &Options::default()).unwrap();
		assert_eq!(outcome.results, vec![Value::Bool(false)]);
		assert!(rec.answers.is_empty());
	}

	#[test]
	fn input_answers_are_coerced()
	{
		let mut env = Environment::new();
		let answers = ["12", "2.5", "no cap"].iter().map(|s| s.to_string()).collect();
		let mut rec = Recorder { answers, ..Recorder::default() };
		run_with("a = hawk()\nb = hawk(\"b? \")\nc = input()", &mut env, &mut rec, &Options::default()).unwrap();

		assert_eq!(env.get("a"), Value::from(12));
		assert_eq!(env.get("b"), Value::from(2.5));
		assert_eq!(env.get("c"), Value::Quoted("\"no cap\"".to_string()));
		assert_eq!(rec.prompts, vec!["BRAINROT>> ", "b? ", "BRAINROT>> "]);
	}

	#[test]
	fn interrupt_keeps_earlier_effects()
	{
		let mut env = Environment::new();
		let mut rec = Recorder::default();
		let res = run_with("x = 1\ntuah(x)\ny = hawk()\nz = 3", &mut env, &mut rec, &Options::default());
		assert_eq!(res, Err(Interrupted));
		assert_eq!(env.get("x"), Value::from(1));
		assert!(env.lookup("y").is_none());
		assert!(env.lookup("z").is_none());
		assert_eq!(rec.output, vec!["1"]);
	}

	#[test]
	fn type_faults()
	{
		let (outcome, _, output) = run("\"a\" * 2\n1 < \"a\"\n-nocap");
		assert!(outcome.results.is_empty());
		assert_eq!(output, vec![
			"Runtime error: unsupported operand types for '*': text and number",
			"Runtime error: '<' not supported between number and text",
			"Runtime error: bad operand type for unary '-': boolean",
		]);
	}
}
