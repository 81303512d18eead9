// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;
use anyhow::{Context, Result};
use lintel::reporter::{BufferedOutput, MinimalReporter};
use lintel::streams::SharedBuffer;
use lintel_harness::RunTester;
use lintel_harness::inject::VirtualSource;

const B_CODE: &str = "
from .c import foobar
from .d import bla  # module does not exist

foobar('hello')
bla()
";

const C_CODE: &str = "
def foobar(arg):
    pass
";

fn check_stdin(input_path: &str, module: &str, expected_path: &str) -> Result<()> {
    let mut tester = RunTester::new();
    let expected = format!(
        "************* Module {module}\n\
         {expected_path}:1:0: W0611: Unused import os (unused-import)\n\n"
    );

    tester.inject_stdin(VirtualSource::new(input_path, "import os\n"));
    tester.check_output(&["--from-stdin", input_path, "--disable=all", "--enable=unused-import"], &expected)?;

    tester.injected().context("no stdin source installed")?.assert_called_once()?;
    Ok(())
}

#[test]
fn stdin_enable_before_disable_all() -> Result<()> {
    let mut tester = RunTester::new();
    let mut reporter = MinimalReporter::new();
    let sink = SharedBuffer::new();

    tester.inject_stdin(VirtualSource::new("mymodule.py", "import os\n"));
    let status = tester.run_linter(
        &["--from-stdin", "mymodule.py", "--enable=unused-import", "--disable=all"],
        &sink,
        Some(&mut reporter),
    )?;

    assert_eq!(status, 4);
    assert_eq!(reporter.messages().len(), 1);
    assert_eq!(reporter.messages()[0].symbol(), "unused-import");
    assert_eq!(reporter.output(), "mymodule.py:1:0: W0611: Unused import os (unused-import)\n");
    tester.injected().context("no stdin source installed")?.assert_called_once()?;
    Ok(())
}

#[test]
fn stdin_with_absolute_path() -> Result<()> {
    let path = fixture("mymodule.py");
    check_stdin(&path, "mymodule", &path)
}

#[test]
fn stdin_with_relative_path() -> Result<()> {
    check_stdin("mymodule.py", "mymodule", "mymodule.py")
}

#[test]
fn stdin_missing_modulename() -> Result<()> {
    let tester = RunTester::new();
    tester.runtest(&["--from-stdin"], 32)
}

fn check_relative_imports(write_b_to_disk: bool) -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.package("a")?.module("a/c.py", C_CODE)?;
    if write_b_to_disk {
        tree.module("a/b.py", B_CODE)?;
    }
    let _cwd = WorkingDirectory::enter(tree.path())?;

    let expected = "************* Module a.b\n\
                    a/b.py:3:0: E0401: Unable to import 'a.d' (import-error)\n\n";

    if write_b_to_disk {
        tester.check_output(&["a/b.py", "--disable=all", "--enable=import-error"], expected)?;
    }

    // The module resolves the same with or without a file on the disk.
    tester.inject_stdin(VirtualSource::new("a/b.py", B_CODE));
    tester.check_output(&["--from-stdin", "a/b.py", "--disable=all", "--enable=import-error"], expected)?;
    tester.injected().context("no stdin source installed")?.assert_called_once()?;
    Ok(())
}

#[test]
fn relative_imports_without_file_on_disk() -> Result<()> {
    check_relative_imports(false)
}

#[test]
fn relative_imports_with_file_on_disk() -> Result<()> {
    check_relative_imports(true)
}

#[test]
fn relative_imports_with_absolute_path() -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.package("a")?.module("a/c.py", C_CODE)?;
    let path = tree.path().join("a").join("b.py");
    let path = path.to_string_lossy().into_owned();
    let path = path.as_str();

    tester.inject_stdin(VirtualSource::new(path, B_CODE));
    tester.check_output(
        &["--from-stdin", path, "--disable=all", "--enable=import-error"],
        &format!("************* Module a.b\n{path}:3:0: E0401: Unable to import 'a.d' (import-error)"),
    )?;
    tester.runtest(&["--from-stdin", path, "--disable=all", "--enable=import-error"], 2)
}

#[test]
fn stdin_syntax_error() -> Result<()> {
    let mut tester = RunTester::new();
    let expected = "************* Module a\n\
                    a.py:1:4: E0001: invalid syntax (<unknown>, line 1) (syntax-error)";

    tester.inject_stdin(VirtualSource::new("a.py", "for\n"));
    tester.check_output(&["--from-stdin", "a.py", "--disable=all", "--enable=syntax-error"], expected)?;

    tester.injected().context("no stdin source installed")?.assert_called_once()?;
    Ok(())
}

#[test]
fn stdin_syntax_error_enable_before_disable_all() -> Result<()> {
    let mut tester = RunTester::new();

    tester.inject_stdin(VirtualSource::new("a.py", "for\n"));
    tester.check_output(
        &["--from-stdin", "a.py", "--enable=syntax-error", "--disable=all"],
        "************* Module a\na.py:1:4: E0001: invalid syntax",
    )?;
    tester.runtest(&["--from-stdin", "a.py", "--enable=syntax-error", "--disable=all"], 2)
}

#[test]
fn relative_imports_enable_before_disable_all() -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.package("a")?.module("a/c.py", C_CODE)?;
    let _cwd = WorkingDirectory::enter(tree.path())?;

    tester.inject_stdin(VirtualSource::new("a/b.py", B_CODE));
    tester.check_output(
        &["--from-stdin", "a/b.py", "--enable=import-error", "--disable=all"],
        "************* Module a.b\n\
         a/b.py:3:0: E0401: Unable to import 'a.d' (import-error)\n\n",
    )?;
    tester.injected().context("no stdin source installed")?.assert_called_once()?;
    Ok(())
}

#[test]
fn stdin_beyond_top_level() -> Result<()> {
    let mut tester = RunTester::new();

    tester.inject_stdin(VirtualSource::new("top.py", "from .. import sibling\n"));
    tester.check_output(
        &["--from-stdin", "top.py", "--disable=all", "--enable=relative-beyond-top-level"],
        "top.py:1:0: E0402: Attempted relative import beyond top-level package (relative-beyond-top-level)",
    )
}
