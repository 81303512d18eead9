// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use lintel_harness::RunTester;
use lintel_harness::inject::VirtualSource;

#[test]
fn exit_code_for_usage_errors() -> Result<()> {
    // Usage errors have their own status, no analysis is done.
    let tester = RunTester::new();

    tester.runtest(&["--from-stdin"], 32)?;
    tester.runtest(&["--from-stdin", "a.py", "b.py"], 32)?;
    tester.runtest(&["--no-such-option", "a.py"], 32)?;
    tester.runtest(&["--disable=no-such-message", "a.py"], 32)?;
    tester.runtest(&["--score=maybe", "a.py"], 32)?;
    Ok(())
}

#[test]
fn exit_code_for_help() -> Result<()> {
    let tester = RunTester::new();

    tester.runtest(&["--help"], 0)?;
    tester.check_output(&["--help"], "--from-stdin")
}

#[test]
fn exit_code_for_clean_module() -> Result<()> {
    let mut tester = RunTester::new();

    tester.inject_stdin(VirtualSource::new("clean.py", "import os\n\nprint(os.sep)\n"));
    tester.runtest(&["--from-stdin", "clean.py"], 0)
}

#[test]
fn exit_code_for_message_categories() -> Result<()> {
    // The status has one bit for each category of the emitted messages.
    let mut tester = RunTester::new();
    tester.inject_stdin(VirtualSource::new("m.py", "import os\nimport missing_module_xyz\n"));

    tester.runtest(&["--from-stdin", "m.py"], 2 | 4)?;
    tester.runtest(&["--from-stdin", "m.py", "--disable=W"], 2)?;
    tester.runtest(&["--from-stdin", "m.py", "--disable=import-error"], 4)?;
    tester.runtest(&["--from-stdin", "m.py", "--disable=all"], 0)?;
    Ok(())
}

#[test]
fn exit_code_for_syntax_error() -> Result<()> {
    let mut tester = RunTester::new();

    tester.inject_stdin(VirtualSource::new("broken.py", "x = = 1\n"));
    tester.runtest(&["--from-stdin", "broken.py"], 2)
}

#[test]
fn exit_code_for_missing_module() -> Result<()> {
    // A module which can not be found is fatal, and can not be disabled.
    let tester = RunTester::new();

    tester.runtest(&["nonexistent", "--disable=all"], 1)?;
    tester.check_output(&["nonexistent"], "nonexistent:1:0: F0001: No module named nonexistent (fatal)")
}
