// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;
use anyhow::Result;
use lintel::reporter::{BufferedOutput, MinimalReporter, TextReporter};
use lintel::streams::SharedBuffer;
use lintel_harness::RunTester;
use lintel_harness::inject::VirtualSource;

#[test]
fn minimal_reporter_output() -> Result<()> {
    let mut tester = RunTester::new();
    let mut reporter = MinimalReporter::new();

    tester.inject_stdin(VirtualSource::new("mymodule.py", "import os\n"));
    tester.check_output_with_reporter(
        &["--from-stdin", "mymodule.py", "--disable=all", "--enable=unused-import"],
        "mymodule.py:1:0: W0611: Unused import os (unused-import)",
        &mut reporter,
    )?;

    assert_eq!(reporter.messages().len(), 1);
    assert_eq!(reporter.messages()[0].symbol(), "unused-import");
    assert!(!reporter.output().contains("*************"));
    Ok(())
}

#[test]
fn minimal_reporter_status() -> Result<()> {
    let mut tester = RunTester::new();
    let mut reporter = MinimalReporter::new();

    tester.inject_stdin(VirtualSource::new("mymodule.py", "import os\n"));
    tester.runtest_with_reporter(&["--from-stdin", "mymodule.py"], &mut reporter, 4)
}

#[test]
fn reporter_output_is_not_the_stream_output() -> Result<()> {
    // The messages go to the given reporter, nothing is printed.
    let tester = RunTester::new();
    let mut reporter = MinimalReporter::new();
    let sink = SharedBuffer::new();
    let path = fixture("mymodule.py");

    let status = tester.run_linter(&[path.as_str()], &sink, Some(&mut reporter))?;

    assert_eq!(status, 4);
    assert!(sink.is_empty());
    assert!(reporter.output().contains("mymodule.py:1:0: W0611: Unused import os (unused-import)"));
    Ok(())
}

#[test]
fn text_reporter_with_score() -> Result<()> {
    let tester = RunTester::new();
    let mut reporter = TextReporter::new(SharedBuffer::new());
    let path = fixture("mymodule.py");

    tester.check_output_with_reporter(
        &[path.as_str()],
        &format!(
            "************* Module mymodule\n\
             {path}:1:0: W0611: Unused import os (unused-import)\n\
             \n\
             ------------------------------------------------------------------\n\
             Your code has been rated at 0.00/10"
        ),
        &mut reporter,
    )
}
