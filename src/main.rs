use std::fs;
use std::io::{self, Write};

use carve::analysis::DEFAULT_MODULE_NAME;
use carve::{
	ExtractError, ExtractMessageSeverity, ExtractOptions, Extraction, Extractor, InterfaceLibrary, ModuleInterface,
	Statement,
};
use clap::{command, Arg, ArgAction};
use log::info;
use miette::Diagnostic;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CarveError {
	#[error(transparent)]
	#[diagnostic(code(hdlcarve::io_error))]
	IoError(#[from] io::Error),

	#[error("Cannot read the input document: {0}")]
	#[diagnostic(
		code(hdlcarve::json_error),
		help("the input must be an object with a 'statements' list and an optional 'interfaces' list")
	)]
	JsonError(#[from] serde_json::Error),

	#[error(transparent)]
	#[diagnostic(
		code(hdlcarve::extract_error),
		help("check the region markers, the declarations and the interface library")
	)]
	ExtractError(#[from] ExtractError),

	#[error("Extraction reported {0} warning(s)")]
	#[diagnostic(
		code(hdlcarve::denied_warnings),
		help("run without --deny-warnings to accept the result anyway")
	)]
	DeniedWarnings(usize),
}

/// Input document read by the binary
#[derive(Deserialize, Debug)]
struct InputDocument {
	statements: Vec<Statement>,

	#[serde(default)]
	interfaces: Vec<ModuleInterface>,
}

fn read_input(path: &str) -> Result<InputDocument, CarveError> {
	let content = fs::read_to_string(path)?;
	let doc: InputDocument = serde_json::from_str(&content)?;
	info!(
		"Read {} statements and {} interfaces from '{}'",
		doc.statements.len(),
		doc.interfaces.len(),
		path
	);
	Ok(doc)
}

fn write_text(extraction: &Extraction, output: &mut dyn Write) -> Result<(), CarveError> {
	let module = &extraction.module;
	writeln!(output, "module {}(", module.name)?;
	for (i, port) in module.ports.iter().enumerate() {
		let sep = if i + 1 < module.ports.len() { "," } else { "" };
		writeln!(output, "\t{}{}", port, sep)?;
	}
	writeln!(output, ");")?;

	for wire in &module.wires {
		writeln!(output, "\t{}", wire)?;
	}
	writeln!(output, "\t// {} statement(s) in body", module.body.len())?;
	writeln!(output, "endmodule")?;

	for msg in extraction.report.messages() {
		writeln!(output, "// {}", msg)?;
	}
	Ok(())
}

fn write_json(extraction: &Extraction, output: &mut dyn Write) -> Result<(), CarveError> {
	serde_json::to_writer_pretty(&mut *output, extraction)?;
	writeln!(output)?;
	Ok(())
}

fn main() -> miette::Result<()> {
	env_logger::init();

	let matches = command!()
		.arg(
			Arg::new("source")
				.required(true)
				.help("JSON document with the statement stream and module interfaces"),
		)
		.arg(
			Arg::new("output")
				.short('o')
				.long("output")
				.help("Output file, '-' for standard output"),
		)
		.arg(
			Arg::new("name")
				.short('n')
				.long("name")
				.default_value(DEFAULT_MODULE_NAME)
				.help("Name of the extracted module"),
		)
		.arg(
			Arg::new("format")
				.short('f')
				.long("format")
				.value_parser(["json", "text"])
				.default_value("json")
				.help("Output format"),
		)
		.arg(
			Arg::new("deny-warnings")
				.long("deny-warnings")
				.action(ArgAction::SetTrue)
				.help("Fail if the extraction reports any warnings"),
		)
		.get_matches();

	let source = matches.get_one::<String>("source").map(String::as_str).unwrap_or("");
	let doc = read_input(source)?;
	let interfaces: InterfaceLibrary = doc.interfaces.into_iter().collect();

	let options = ExtractOptions {
		module_name: matches
			.get_one::<String>("name")
			.cloned()
			.unwrap_or_else(|| DEFAULT_MODULE_NAME.into()),
	};

	let extraction = Extractor::new(&doc.statements, &interfaces)
		.with_options(options)
		.run()
		.map_err(CarveError::from)?;

	if matches.get_flag("deny-warnings") {
		let warnings = extraction
			.report
			.messages()
			.iter()
			.filter(|m| m.severity() >= ExtractMessageSeverity::Warning)
			.count();
		if warnings > 0 {
			return Err(CarveError::DeniedWarnings(warnings).into());
		}
	}

	let mut output: Box<dyn Write> = match matches.get_one::<String>("output").map(String::as_str) {
		None | Some("-") => Box::new(io::stdout()),
		Some(path) => Box::new(fs::File::create(path).map_err(CarveError::from)?),
	};

	match matches.get_one::<String>("format").map(String::as_str) {
		Some("text") => write_text(&extraction, &mut output)?,
		_ => write_json(&extraction, &mut output)?,
	}

	Ok(())
}
