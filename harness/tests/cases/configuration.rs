// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;
use anyhow::Result;
use lintel_harness::RunTester;
use lintel_harness::inject::VirtualSource;

const DISABLE_ALL: &str = "schema: 1.0\ndisable: [all]\n";

const SOURCE: &str = "import os\nimport missing_module_xyz\n";

#[test]
fn config_from_environment_is_ignored() -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.module("user.yml", DISABLE_ALL)?;
    let _rcfile = Variable::set("LINTELRC", tree.path().join("user.yml"));

    tester.inject_stdin(VirtualSource::new("m.py", SOURCE));
    tester.runtest(&["--from-stdin", "m.py"], 6)
}

#[test]
fn config_in_working_directory_is_ignored() -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.module("lintel.yml", DISABLE_ALL)?;
    let _cwd = WorkingDirectory::enter(tree.path())?;

    tester.inject_stdin(VirtualSource::new("m.py", SOURCE));
    tester.runtest(&["--from-stdin", "m.py"], 6)
}

#[test]
fn explicit_config_is_used() -> Result<()> {
    let mut tester = RunTester::new();
    let tree = ModuleTree::new()?;
    tree.module("custom.yml", "schema: 1.0\ndisable: [all]\nenable: [import-error]\n")?;
    let rcfile = tree.path().join("custom.yml").to_string_lossy().into_owned();
    let rcfile = rcfile.as_str();

    tester.inject_stdin(VirtualSource::new("m.py", SOURCE));
    tester.runtest(&["--from-stdin", "m.py", "--rcfile", rcfile], 2)?;
    tester.check_output(
        &["--from-stdin", "m.py", "--rcfile", rcfile],
        "m.py:2:0: E0401: Unable to import 'missing_module_xyz' (import-error)",
    )
}
