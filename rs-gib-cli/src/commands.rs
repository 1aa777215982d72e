use std::cmp::Ordering;
use std::io::{self, Write};

use anyhow::{Context, Result};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rs_gib_core::io::{build_output_path, read_lines, write_lines};
use rs_gib_core::model::entropy::shannon_entropy;
use rs_gib_core::{Assessment, Error, MarkovModel, ModelConfig};

use super::{GenerateArgs, ScoreArgs, Show, SplitArgs, TestArgs, TestBothArgs, TrainArgs};

fn load(path: &std::path::Path) -> Result<MarkovModel> {
	MarkovModel::load(path).with_context(|| format!("cannot load model {}", path.display()))
}

/// Assesses `line`, mapping an unscorable line to `None`.
fn try_assess(model: &MarkovModel, line: &str) -> Result<Option<Assessment>> {
	match model.assess(line) {
		Ok(assessment) => Ok(Some(assessment)),
		Err(Error::UnscorableInput { .. }) => Ok(None),
		Err(e) => Err(e.into()),
	}
}

pub fn train(args: &TrainArgs) -> Result<()> {
	let mut config = ModelConfig::new(args.ngram)?;
	config.padding = !args.no_padding;
	config.set_smoothing(args.smoothing)?;
	config.set_unknown_policy(args.policy.with_penalty(args.penalty))?;
	config.score_form = args.form.into();

	info!("training {}-gram model from {} file(s)", args.ngram, args.corpus.len());
	let mut model = MarkovModel::train_from_files(&args.corpus, config).context("training failed")?;
	let calibration = model
		.calibrate_from_files(&args.good, &args.bad)
		.context("calibration failed")?;

	let output = match &args.output {
		Some(path) => path.clone(),
		None => build_output_path(&args.corpus[0], "bin")?,
	};
	model.save(&output).with_context(|| format!("cannot write model {}", output.display()))?;

	let mut stdout = io::stdout().lock();
	writeln!(stdout, "Threshold: {}", calibration.threshold)?;
	writeln!(stdout, "Min good: {}, Max bad: {}", calibration.min_good, calibration.max_bad)?;
	writeln!(
		stdout,
		"Positives: {}, Negatives: {}, Skipped: {}, Overlap: {}",
		calibration.positives, calibration.negatives, calibration.skipped, calibration.overlap
	)?;
	writeln!(stdout, "Model: {}", output.display())?;
	Ok(())
}

pub fn test(args: &TestArgs) -> Result<()> {
	let model = load(&args.model)?;
	if model.threshold().is_none() {
		return Err(Error::Uncalibrated.into());
	}
	let lines = read_lines(&args.input)?;

	let mut stdout = io::stdout().lock();
	let (mut good, mut total, mut unscorable) = (0usize, 0usize, 0usize);
	for line in &lines {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		total += 1;

		let valid = match try_assess(&model, line)? {
			Some(assessment) => assessment.good == Some(true),
			None => {
				unscorable += 1;
				false
			}
		};
		if valid {
			good += 1;
		}
		match (args.show, valid) {
			(Show::Good, true) | (Show::Bad, false) => writeln!(stdout, "{line}")?,
			_ => (),
		}
	}

	let accuracy = if total == 0 { 0.0 } else { good as f64 / total as f64 };
	writeln!(
		stdout,
		"Good: {good}, Total: {total}, Unscorable: {unscorable}, Accuracy: {accuracy:.6}"
	)?;
	Ok(())
}

pub fn test_both(args: &TestBothArgs) -> Result<()> {
	let model_a = load(&args.model_a)?;
	let model_b = load(&args.model_b)?;
	if model_a.config().score_form != model_b.config().score_form {
		warn!("models use different score forms, their scores are not comparable");
	}
	let lines = read_lines(&args.input)?;

	let mut stdout = io::stdout().lock();
	let (mut wins_a, mut wins_b, mut ties, mut unscorable) = (0usize, 0usize, 0usize, 0usize);
	for line in &lines {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		let a = try_assess(&model_a, line)?.map(|assessment| assessment.score);
		let b = try_assess(&model_b, line)?.map(|assessment| assessment.score);
		let winner = match (a, b) {
			(Some(a), Some(b)) => match a.total_cmp(&b) {
				Ordering::Greater => "a",
				Ordering::Less => "b",
				Ordering::Equal => "tie",
			},
			(Some(_), None) => "a",
			(None, Some(_)) => "b",
			(None, None) => "-",
		};
		match winner {
			"a" => wins_a += 1,
			"b" => wins_b += 1,
			"tie" => ties += 1,
			_ => unscorable += 1,
		}

		writeln!(stdout, "{}\t{}\t{winner}\t{line}", format_score(a), format_score(b))?;
	}

	writeln!(stdout, "A: {wins_a}, B: {wins_b}, Ties: {ties}, Unscorable: {unscorable}")?;
	Ok(())
}

fn format_score(score: Option<f64>) -> String {
	match score {
		Some(score) => format!("{score:.6}"),
		None => "-".to_owned(),
	}
}

pub fn generate(args: &GenerateArgs) -> Result<()> {
	let model = load(&args.model)?;
	let mut rng = match args.seed {
		Some(seed) => StdRng::seed_from_u64(seed),
		None => StdRng::from_os_rng(),
	};

	let mut stdout = io::stdout().lock();
	for _ in 0..args.count {
		writeln!(stdout, "{}", model.generate(args.length, &mut rng))?;
	}
	Ok(())
}

pub fn score(args: &ScoreArgs) -> Result<()> {
	let model = load(&args.model)?;

	let mut stdout = io::stdout().lock();
	for text in &args.text {
		let entropy = shannon_entropy(text);
		match model.assess(text) {
			Ok(Assessment { likelihood, score, good }) => {
				let verdict = match good {
					Some(true) => "good",
					Some(false) => "gibberish",
					None => "uncalibrated",
				};
				writeln!(
					stdout,
					"{text}\tscore={score:.6}\tlog_likelihood={:.6}\tentropy={entropy:.3}\t{verdict}",
					likelihood.sum
				)?;
			}
			Err(Error::UnscorableInput { ngram }) => {
				writeln!(stdout, "{text}\tunscorable ({ngram:?})\tentropy={entropy:.3}\tgibberish")?;
			}
			Err(e) => return Err(e.into()),
		}
	}
	Ok(())
}

pub fn split(args: &SplitArgs) -> Result<()> {
	let mut lines = read_lines(&args.input)?;
	let mut rng = StdRng::seed_from_u64(args.seed);
	lines.shuffle(&mut rng);

	let cut = (lines.len() as f64 * args.ratio) as usize;
	let (train, test) = lines.split_at(cut);
	write_lines(&args.train, train).with_context(|| format!("cannot write {}", args.train.display()))?;
	write_lines(&args.test, test).with_context(|| format!("cannot write {}", args.test.display()))?;

	info!("split {} lines: {} train, {} test", lines.len(), train.len(), test.len());
	Ok(())
}
