use std::collections::VecDeque;

use log::{debug, trace};
use thiserror::Error;

use super::environment::Environment;
use super::interpreter::{self, Effects, Interrupted, Options, Outcome};
use super::lexer;
use super::parser::{self, SyntaxError};

pub const BANNER: &str = "\
🔥 BRAINROT COMPILER v1.0 🔥
Type your code line by line
'SLAYY' to execute | 'GGS' to quit";

/// One read from the line source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line
{
	Text(String),
	Eof,
	Interrupted,
}

#[derive(Debug, Error)]
#[error("console failure: {0}")]
pub struct ConsoleError(pub String);

/// The line-oriented front end a session talks to.
pub trait Console: Effects
{
	fn read_line(&mut self, prompt: &str) -> Result<Line, ConsoleError>;

	/// Called for every line that lands in the source buffer.
	fn add_history(&mut self, _line: &str) {}
}

#[derive(Debug, Clone)]
pub struct SessionConfig
{
	pub prompt: String,
	/// Control word that executes the buffer. Matched case-insensitively.
	pub run_word: String,
	/// Control word that ends the session. Matched case-insensitively.
	pub quit_word: String,
	pub options: Options,
}

impl Default for SessionConfig
{
	fn default() -> Self
	{
		Self
		{
			prompt: "BRAINROT> ".to_string(),
			run_word: "slayy".to_string(),
			quit_word: "ggs".to_string(),
			options: Options::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State
{
	Buffering,
	Executing,
	Idle,
	Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control
{
	Continue,
	Quit,
}

/// Why `Session::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending
{
	Quit,
	EndOfInput,
	Interrupted,
}

/// Result of executing one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission
{
	/// The run word arrived with nothing buffered.
	Empty,
	Rejected(SyntaxError),
	Completed(Outcome),
}

pub struct Session
{
	env: Environment,
	buffer: Vec<String>,
	state: State,
	config: SessionConfig,
}

impl Session
{
	pub fn new(config: SessionConfig) -> Self
	{
		Self
		{
			env: Environment::new(),
			buffer: vec![],
			state: State::Buffering,
			config,
		}
	}

	pub fn environment(&self) -> &Environment
	{
		&self.env
	}

	pub fn buffer(&self) -> &[String]
	{
		&self.buffer
	}

	pub fn state(&self) -> State
	{
		self.state
	}

	fn transition(&mut self, to: State)
	{
		trace!("session {:?} -> {:?}", self.state, to);
		self.state = to;
	}

	/// Feeds one raw line: a control word, or source for the buffer.
	pub fn handle_line<C: Console>(&mut self, line: &str, console: &mut C) -> Result<Control, Interrupted>
	{
		let line = line.trim();

		if line.eq_ignore_ascii_case(&self.config.quit_word)
		{
			self.transition(State::Closed);
			return Ok(Control::Quit);
		}

		if line.eq_ignore_ascii_case(&self.config.run_word)
		{
			self.execute(console)?;
		}
		else if !line.is_empty()
		{
			console.add_history(line);
			self.buffer.push(line.to_string());
		}

		Ok(Control::Continue)
	}

	/// Runs and clears the buffer. The environment carries over to the next submission.
	pub fn execute<C: Console>(&mut self, console: &mut C) -> Result<Submission, Interrupted>
	{
		if self.buffer.is_empty()
		{
			console.write_output("No code to execute!");
			return Ok(Submission::Empty);
		}

		let source = self.buffer.join("\n") + "\n";
		self.buffer.clear();

		self.transition(State::Executing);
		let ret = self.run_source(&source, console);

		match &ret
		{
			Ok(_) =>
			{
				self.transition(State::Idle);
				self.transition(State::Buffering);
			},
			Err(_) => self.transition(State::Closed),
		}

		ret
	}

	/// Tokenizes, parses and evaluates `source` as one submission.
	///
	/// Lexical errors are reported and skipped. A syntax error rejects the whole
	/// submission before anything runs, so the environment stays as it was.
	pub fn run_source<C: Console>(&mut self, source: &str, console: &mut C) -> Result<Submission, Interrupted>
	{
		let mut tokens = vec![];
		for item in lexer::tokenize(source)
		{
			match item
			{
				Ok(tok) => tokens.push(tok),
				Err(err) =>
				{
					debug!("{}", err);
					console.write_output(&err.to_string());
				},
			}
		}
		debug!("{} tokens", tokens.len());

		let program = match parser::parse(tokens)
		{
			Ok(program) => program,
			Err(err) =>
			{
				debug!("submission rejected: {}", err);
				console.write_output(&err.to_string());
				return Ok(Submission::Rejected(err));
			},
		};

		let outcome = interpreter::evaluate(&program, &mut self.env, console, &self.config.options)?;
		if let Some(value) = outcome.headline()
		{
			console.write_output(&format!("Result: {}", value));
		}

		Ok(Submission::Completed(outcome))
	}

	/// The read-eval loop. Returns once the session is over.
	pub fn run<C: Console>(&mut self, console: &mut C) -> Result<Ending, ConsoleError>
	{
		loop
		{
			let line = match console.read_line(&self.config.prompt)?
			{
				Line::Text(line) => line,
				Line::Eof =>
				{
					self.transition(State::Closed);
					return Ok(Ending::EndOfInput);
				},
				Line::Interrupted => break,
			};

			match self.handle_line(&line, console)
			{
				Ok(Control::Continue) => (),
				Ok(Control::Quit) =>
				{
					console.write_output("Compilation finished! GG!");
					return Ok(Ending::Quit);
				},
				Err(Interrupted) => break,
			}
		}

		self.transition(State::Closed);
		console.write_output("Emergency exit! GG!");
		Ok(Ending::Interrupted)
	}
}

/// Console backed by queues, for embedding and tests.
///
/// `lines` feeds `read_line`, `answers` feeds input requests; running out of
/// either reads as end of input.
#[derive(Debug, Default)]
pub struct MemoryConsole
{
	pub lines: VecDeque<String>,
	pub answers: VecDeque<String>,
	pub output: Vec<String>,
	pub history: Vec<String>,
}

impl MemoryConsole
{
	pub fn new<I, S>(lines: I) -> Self where I: IntoIterator<Item = S>, S: Into<String>
	{
		Self
		{
			lines: lines.into_iter().map(Into::into).collect(),
			..Self::default()
		}
	}

	pub fn with_answers<I, S>(mut self, answers: I) -> Self where I: IntoIterator<Item = S>, S: Into<String>
	{
		self.answers = answers.into_iter().map(Into::into).collect();
		self
	}
}

impl Effects for MemoryConsole
{
	fn write_output(&mut self, text: &str)
	{
		self.output.push(text.to_string());
	}

	fn request_input(&mut self, _prompt: &str) -> Result<String, Interrupted>
	{
		self.answers.pop_front().ok_or(Interrupted)
	}
}

impl Console for MemoryConsole
{
	fn read_line(&mut self, _prompt: &str) -> Result<Line, ConsoleError>
	{
		Ok(self.lines.pop_front().map_or(Line::Eof, Line::Text))
	}

	fn add_history(&mut self, line: &str)
	{
		self.history.push(line.to_string());
	}
}
