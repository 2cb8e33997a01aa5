use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use brainrot::interpreter::{Effects, Interrupted, Options};
use brainrot::session::{Console, ConsoleError, Ending, Line, Session, SessionConfig, BANNER};
use clap::Parser;
use log::{info, LevelFilter};
use rustyline::error::ReadlineError;
use rustyline::Editor;

#[derive(Parser, Debug)]
#[command(name = "brainrot", version, about)]
struct Args
{
	/// Script to run as a single submission instead of starting the REPL
	file: Option<PathBuf>,

	/// Source to run as a single submission
	#[arg(short, long, conflicts_with = "file")]
	command: Option<String>,

	/// Reading an unassigned variable is a runtime error instead of 0
	#[arg(long)]
	strict: bool,

	/// Word that executes the buffered lines
	#[arg(long, default_value = "slayy")]
	run_word: String,

	/// Word that ends the session
	#[arg(long, default_value = "ggs")]
	quit_word: String,

	/// Log more (-v debug, -vv trace); RUST_LOG takes precedence
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

struct Terminal
{
	rl: Editor<()>,
}

impl Effects for Terminal
{
	fn write_output(&mut self, text: &str)
	{
		println!("{}", text);
	}

	fn request_input(&mut self, prompt: &str) -> Result<String, Interrupted>
	{
		self.rl.readline(prompt).map_err(|_| Interrupted)
	}
}

impl Console for Terminal
{
	fn read_line(&mut self, prompt: &str) -> Result<Line, ConsoleError>
	{
		match self.rl.readline(prompt)
		{
			Ok(line) => Ok(Line::Text(line)),
			Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
			Err(ReadlineError::Eof) => Ok(Line::Eof),
			Err(err) => Err(ConsoleError(format!("{:?}", err))),
		}
	}

	fn add_history(&mut self, line: &str)
	{
		self.rl.add_history_entry(line);
	}
}

fn init_logging(verbose: u8)
{
	let level = match verbose
	{
		0 => LevelFilter::Warn,
		1 => LevelFilter::Debug,
		_ => LevelFilter::Trace,
	};

	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.init();
}

fn main() -> Result<()>
{
	let args = Args::parse();
	init_logging(args.verbose);

	let config = SessionConfig
	{
		run_word: args.run_word,
		quit_word: args.quit_word,
		options: Options
		{
			strict: args.strict,
			..Options::default()
		},
		..SessionConfig::default()
	};

	let mut session = Session::new(config);
	let mut terminal = Terminal { rl: Editor::<()>::new() };

	let source = match (args.command, args.file)
	{
		(Some(command), _) => Some(command),
		(None, Some(path)) => Some(fs::read_to_string(&path)
			.with_context(|| format!("cannot read {}", path.display()))?),
		(None, None) => None,
	};

	if let Some(source) = source
	{
		if session.run_source(&source, &mut terminal).is_err()
		{
			terminal.write_output("Emergency exit! GG!");
		}
		return Ok(());
	}

	println!("{}", BANNER);
	let ending = session.run(&mut terminal)?;
	info!("session ended: {:?}", ending);

	if ending == Ending::EndOfInput
	{
		println!();
	}

	Ok(())
}
