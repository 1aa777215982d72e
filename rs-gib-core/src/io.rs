use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::{fs, io};

use crate::error::{Error, Result};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the file line by line
/// - Splits on `\n` / `\r\n`
/// - Invalid UTF-8 is replaced rather than rejected
///
/// # Errors
/// Any I/O failure is reported as [`Error::CorpusReadFailure`] carrying the path.
pub fn read_lines<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let path = filename.as_ref();
	let read_failure = |source: io::Error| Error::CorpusReadFailure { path: path.to_owned(), source };

	let mut reader = BufReader::new(File::open(path).map_err(read_failure)?);
	let mut lines = Vec::new();
	let mut buffer = Vec::new();
	loop {
		buffer.clear();
		if reader.read_until(b'\n', &mut buffer).map_err(read_failure)? == 0 {
			break;
		}
		let line = String::from_utf8_lossy(&buffer);
		lines.push(line.trim_end_matches(['\n', '\r']).to_owned());
	}
	Ok(lines)
}

/// Writes lines to a file, one per line.
pub fn write_lines<P, I, S>(filename: P, lines: I) -> io::Result<()>
where
	P: AsRef<Path>,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut contents = String::new();
	for line in lines {
		contents.push_str(line.as_ref());
		contents.push('\n');
	}
	fs::write(filename, contents)
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/corpus.txt` + `"bin"` → `data/corpus.bin`
pub fn build_output_path<P: AsRef<Path>>(
	input_path: P,
	output_extension: &str,
) -> io::Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}
