//! rs-gib CLI: train, test and sample character n-gram gibberish filters.
//!
//! Thin wrapper over the `rs-gib-core` library crate.

mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rs_gib_core::model::config::{DEFAULT_NGRAM_SIZE, DEFAULT_UNKNOWN_LOG_PROB};
use rs_gib_core::{ScoreForm, UnknownPolicy};

/// Character n-gram Markov filter telling plausible text from gibberish.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Train a model on a corpus and calibrate its threshold.
	Train(TrainArgs),
	/// Classify every line of a file and report how many look plausible.
	Test(TestArgs),
	/// Compare the scores two models give to every line of a file.
	TestBoth(TestBothArgs),
	/// Sample text from a model.
	Generate(GenerateArgs),
	/// Print scores and verdicts for the given strings.
	Score(ScoreArgs),
	/// Shuffle a line file and split it into train and test files.
	Split(SplitArgs),
}

#[derive(Args, Debug)]
struct TrainArgs {
	/// Corpus files, one example per line.
	#[arg(required = true)]
	corpus: Vec<PathBuf>,

	/// N-gram size (>= 2).
	#[arg(short = 'n', long, default_value_t = DEFAULT_NGRAM_SIZE)]
	ngram: usize,

	/// Plausible-language examples used for calibration.
	#[arg(long)]
	good: PathBuf,

	/// Gibberish examples used for calibration.
	#[arg(long)]
	bad: PathBuf,

	/// Model output path. Default: first corpus file with a `.bin` extension.
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Pseudo-count added to every transition of an observed context.
	#[arg(long, default_value_t = 0.0)]
	smoothing: f64,

	/// Do not pad lines with spaces.
	#[arg(long)]
	no_padding: bool,

	/// What to do with transitions the corpus never showed.
	#[arg(long, value_enum, default_value_t = PolicyArg::Strict)]
	policy: PolicyArg,

	/// Log-probability charged per unknown transition with `--policy lenient`.
	#[arg(long, default_value_t = DEFAULT_UNKNOWN_LOG_PROB, allow_negative_numbers = true)]
	penalty: f64,

	/// Score form used for calibration and classification.
	#[arg(long, value_enum, default_value_t = FormArg::GeometricMean)]
	form: FormArg,
}

#[derive(Args, Debug)]
struct TestArgs {
	/// Trained model file.
	#[arg(long, env = "GIB_MODEL")]
	model: PathBuf,

	/// Lines to classify.
	input: PathBuf,

	/// Which lines to echo.
	#[arg(long, value_enum, default_value_t = Show::Good)]
	show: Show,
}

#[derive(Args, Debug)]
struct TestBothArgs {
	#[arg(long)]
	model_a: PathBuf,

	#[arg(long)]
	model_b: PathBuf,

	/// Lines to score.
	input: PathBuf,
}

#[derive(Args, Debug)]
struct GenerateArgs {
	#[arg(long, env = "GIB_MODEL")]
	model: PathBuf,

	/// Characters per generated string.
	#[arg(short, long, default_value_t = 40)]
	length: usize,

	/// Number of strings.
	#[arg(short, long, default_value_t = 1)]
	count: usize,

	/// PRNG seed for reproducible output.
	#[arg(long)]
	seed: Option<u64>,
}

#[derive(Args, Debug)]
struct ScoreArgs {
	#[arg(long, env = "GIB_MODEL")]
	model: PathBuf,

	#[arg(required = true)]
	text: Vec<String>,
}

#[derive(Args, Debug)]
struct SplitArgs {
	input: PathBuf,
	train: PathBuf,
	test: PathBuf,

	/// Fraction of lines going to the train file.
	#[arg(long, default_value_t = 0.8, value_parser = parse_ratio)]
	ratio: f64,

	#[arg(long, default_value_t = 42)]
	seed: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum PolicyArg {
	Strict,
	Lenient,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum FormArg {
	Mean,
	GeometricMean,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum Show {
	Good,
	Bad,
	None,
}

impl PolicyArg {
	fn with_penalty(self, penalty: f64) -> UnknownPolicy {
		match self {
			PolicyArg::Strict => UnknownPolicy::Strict,
			PolicyArg::Lenient => UnknownPolicy::Lenient { log_prob: penalty },
		}
	}
}

impl From<FormArg> for ScoreForm {
	fn from(form: FormArg) -> Self {
		match form {
			FormArg::Mean => ScoreForm::Mean,
			FormArg::GeometricMean => ScoreForm::GeometricMean,
		}
	}
}

fn parse_ratio(value: &str) -> Result<f64, String> {
	let ratio: f64 = value.parse().map_err(|_| format!("`{value}` is not a number"))?;
	if !(0.0..=1.0).contains(&ratio) {
		return Err(format!("ratio must be between 0.0 and 1.0, got {ratio}"));
	}
	Ok(ratio)
}

fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let cli = Cli::parse();
	match cli.command {
		Command::Train(args) => commands::train(&args),
		Command::Test(args) => commands::test(&args),
		Command::TestBoth(args) => commands::test_both(&args),
		Command::Generate(args) => commands::generate(&args),
		Command::Score(args) => commands::score(&args),
		Command::Split(args) => commands::split(&args),
	}
}
