use rstest::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use subprocess::{Exec, ExitStatus, Redirection};
use tempfile::NamedTempFile;

const HDLCARVE: &str = env!("CARGO_BIN_EXE_hdlcarve");

struct RunResult {
	status: ExitStatus,
	stdout: String,
	stderr: String,
}

fn run_hdlcarve(args: &[&str]) -> RunResult {
	let capture = Exec::cmd(HDLCARVE)
		.args(args)
		.stdout(Redirection::Pipe)
		.stderr(Redirection::Pipe)
		.capture()
		.expect("failed to spawn hdlcarve");

	RunResult {
		status: capture.exit_status,
		stdout: capture.stdout_str(),
		stderr: capture.stderr_str(),
	}
}

fn expected_path(input_path: &Path) -> PathBuf {
	let file_name = input_path.file_name().unwrap().to_str().unwrap();
	input_path.with_file_name(file_name.replace(".stream.json", ".expected.json"))
}

fn run_json(input_path: &Path) -> Value {
	let result = run_hdlcarve(&[input_path.to_str().unwrap()]);
	if !result.status.success() {
		eprintln!("hdlcarve failed for {:?}", input_path);
		eprintln!("{}", result.stderr);
		panic!("hdlcarve failed: {:?}", result.status);
	}
	serde_json::from_str(&result.stdout).expect("output is not valid JSON")
}

#[rstest]
fn test_extract_success(#[files("tests/input/*.stream.json")] path: PathBuf) {
	let output = run_json(&path);
	let expected: Value =
		serde_json::from_str(&std::fs::read_to_string(expected_path(&path)).expect("missing expected output")).unwrap();

	assert_eq!(output["module"]["ports"], expected["ports"]);
	assert_eq!(output["module"]["wires"], expected["wires"]);
}

#[rstest]
fn test_extract_failure(#[files("tests/input_invalid/*.stream.json")] path: PathBuf) {
	let result = run_hdlcarve(&[path.to_str().unwrap()]);
	assert!(!result.status.success());
	assert!(result.stdout.is_empty());
}

#[rstest]
fn test_deterministic_output(#[files("tests/input/*.stream.json")] path: PathBuf) {
	assert_eq!(run_json(&path), run_json(&path));
}

#[test]
fn test_output_file_and_name() {
	let out_file = NamedTempFile::new().unwrap();
	let result = run_hdlcarve(&[
		"tests/input/complex.stream.json",
		"-o",
		out_file.path().to_str().unwrap(),
		"--name",
		"my_slice",
		"--format",
		"text",
	]);
	assert!(result.status.success(), "{}", result.stderr);
	assert!(result.stdout.is_empty());

	let text = std::fs::read_to_string(out_file.path()).unwrap();
	assert!(text.starts_with("module my_slice("));
	assert!(text.contains("\tinput logic [15:0] bus_in,\n"));
	assert!(text.contains("\tinput logic signed [7:0] data0,\n"));
	assert!(text.contains("\toutput logic [15:0] bus_out\n"));
	assert!(text.contains("\tlogic [3:0] ccc;\n"));
	assert!(!text.contains("output logic fff"));
}

#[test]
fn test_invalid_module_name() {
	let result = run_hdlcarve(&["tests/input/complex.stream.json", "--name", "0bad"]);
	assert!(!result.status.success());
	assert!(result.stderr.contains("0bad"));
}

#[test]
fn test_deny_warnings() {
	let path = "tests/input/parameterized.stream.json";
	let result = run_hdlcarve(&[path]);
	assert!(result.status.success());

	let output: Value = serde_json::from_str(&result.stdout).unwrap();
	let messages = output["report"]["messages"].as_array().unwrap();
	assert!(messages.iter().any(|m| m["severity"] == "warning"));

	let result = run_hdlcarve(&[path, "--deny-warnings"]);
	assert!(!result.status.success());
	assert!(result.stdout.is_empty());

	// No warnings, so denying them changes nothing
	let result = run_hdlcarve(&["tests/input/complex.stream.json", "--deny-warnings"]);
	assert!(result.status.success());
}
