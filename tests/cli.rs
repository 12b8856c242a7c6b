//! The command line tests.
//!
//! This test looks for `command` files in the `tests/cli` directory; the
//! directories may be nested to group similar tests together.
//!
//! Each test directory may contain:
//!
//! * `command` - the arguments to pass to `wgsl`.
//! * `inputs` - a directory copied to a temporary working directory in which
//!   the command is run.
//! * `stdout` - the expected standard output of the command.
//! * `stderr` - the expected standard error of the command.
//! * `status` - the expected exit code of the command.
//!
//! The expected files may be automatically generated or updated by setting
//! the `BLESS` environment variable when running this test.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use libtest_mimic::Trial;
use pretty_assertions::StrComparison;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Finds the test directories under the given directory.
fn find_tests(root: &Path) -> Vec<PathBuf> {
    let mut tests: Vec<_> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.expect("failed to read directory"))
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == "command")
        .map(|entry| entry.path().parent().unwrap().to_path_buf())
        .collect();
    tests.sort();
    tests
}

/// Copies the test inputs into a new temporary directory.
fn setup_working_directory(test: &Path) -> Result<TempDir> {
    let dir = TempDir::new().context("failed to create temporary directory")?;
    let inputs = test.join("inputs");
    if !inputs.exists() {
        return Ok(dir);
    }

    for entry in WalkDir::new(&inputs) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(&inputs)
            .context("failed to strip path prefix from input")?;
        let to = dir.path().join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&to)
                .with_context(|| format!("failed to create directory `{}`", to.display()))?;
        } else {
            fs::copy(entry.path(), &to)
                .with_context(|| format!("failed to copy file to `{}`", to.display()))?;
        }
    }

    Ok(dir)
}

/// Compares an actual result with the expected result file.
fn compare_result(path: &Path, actual: &str) -> Result<()> {
    let actual = actual.replace("\r\n", "\n");
    if env::var_os("BLESS").is_some() {
        fs::write(path, &actual)
            .with_context(|| format!("failed to write result file `{}`", path.display()))?;
        return Ok(());
    }

    let expected = fs::read_to_string(path)
        .with_context(|| format!("failed to read result file `{}`", path.display()))?
        .replace("\r\n", "\n");
    if expected != actual {
        bail!(
            "result from `{path}` is not as expected:\n{diff}",
            path = path.display(),
            diff = StrComparison::new(&expected, &actual)
        );
    }

    Ok(())
}

/// Runs a single test.
fn run_test(test: &Path) -> Result<()> {
    let command = fs::read_to_string(test.join("command")).context("failed to read command")?;
    let Some(args) = shlex::split(command.trim()) else {
        bail!("command `{command}` is not valid");
    };

    let dir = setup_working_directory(test)?;
    let output = Command::new(env!("CARGO_BIN_EXE_wgsl"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(&args)
        .output()
        .context("failed to run `wgsl`")?;

    let stdout = String::from_utf8(output.stdout).context("stdout is not UTF-8")?;
    let stderr = String::from_utf8(output.stderr).context("stderr is not UTF-8")?;
    let status = format!("{}\n", output.status.code().unwrap_or(-1));

    compare_result(&test.join("stdout"), &stdout)?;
    compare_result(&test.join("stderr"), &stderr)?;
    compare_result(&test.join("status"), &status)
}

fn main() {
    let root = Path::new("tests").join("cli");
    let tests = find_tests(&root)
        .into_iter()
        .map(|test| {
            let name = test
                .strip_prefix(&root)
                .unwrap()
                .to_string_lossy()
                .into_owned();
            Trial::test(name, move || Ok(run_test(&test)?))
        })
        .collect();

    let args = libtest_mimic::Arguments::from_args();
    libtest_mimic::run(&args, tests).exit();
}
