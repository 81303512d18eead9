// SPDX-License-Identifier: GPL-3.0-or-later

use crate::fixtures::*;
use anyhow::Result;
use lintel::checkers::{CheckedModule, Checker};
use lintel::message::{IMPORT_ERROR, Message, MessageDefinition};
use lintel::reporter::BufferedOutput;
use lintel_harness::ConfiguredLinter;
use lintel_harness::inject::VirtualSource;

/// Refuses every import statement.
struct NoImports;

impl Checker for NoImports {
    fn name(&self) -> &'static str {
        "no-imports"
    }

    fn messages(&self) -> &'static [MessageDefinition] {
        &[IMPORT_ERROR]
    }

    fn check(&self, module: &CheckedModule<'_>) -> Vec<Message> {
        module
            .tree
            .imports()
            .into_iter()
            .map(|statement| Message {
                definition: IMPORT_ERROR,
                module: module.description.name.clone(),
                path: module.description.path.clone(),
                line: statement.line,
                column: statement.col,
                text: String::from("Imports are refused"),
            })
            .collect()
    }
}

#[test]
fn registered_checker_runs() -> Result<()> {
    let linter = ConfiguredLinter::new(Some(Box::new(NoImports)), &[], &[])?;
    let tree = ModuleTree::new()?;
    tree.module("m.py", "import os\nimport sys\n\nprint(os.sep, sys.argv)\n")?;
    let path = tree.path().join("m.py").to_string_lossy().into_owned();

    let checked = linter.check(&[path.as_str()])?;

    assert_eq!(checked.status, 2);
    let lines: Vec<_> = checked.reporter.messages().iter().map(|message| message.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(checked.reporter.messages().iter().all(|message| message.text == "Imports are refused"));
    Ok(())
}

#[test]
fn enabled_message_survives_disable_all() -> Result<()> {
    let linter = ConfiguredLinter::new(None, &["unused-import"], &["all"])?;

    let checked = linter.check_stdin(VirtualSource::new("mymodule.py", "import os\nimport missing_module_xyz\n"))?;

    assert_eq!(checked.status, 4);
    assert_eq!(
        checked.reporter.output(),
        "mymodule.py:1:0: W0611: Unused import os (unused-import)\n\
         mymodule.py:2:0: W0611: Unused import missing_module_xyz (unused-import)\n"
    );
    Ok(())
}

#[test]
fn disabled_checker_messages_are_not_reported() -> Result<()> {
    let linter = ConfiguredLinter::new(Some(Box::new(NoImports)), &[], &["import-error"])?;

    let checked = linter.check_stdin(VirtualSource::new("mymodule.py", "import os\n"))?;

    assert_eq!(checked.status, 4);
    assert_eq!(checked.reporter.messages().len(), 1);
    assert_eq!(checked.reporter.messages()[0].symbol(), "unused-import");
    Ok(())
}

#[test]
fn relative_imports_from_stdin() -> Result<()> {
    let tree = ModuleTree::new()?;
    tree.package("a")?.module("a/c.py", "def foobar(arg):\n    pass\n")?;
    let path = tree.path().join("a").join("b.py").to_string_lossy().into_owned();
    let linter = ConfiguredLinter::new(None, &["import-error"], &["all"])?;

    let checked = linter.check_stdin(VirtualSource::new(path, "from .c import foobar\nfrom .d import bla\n"))?;

    assert_eq!(checked.status, 2);
    assert_eq!(checked.reporter.messages().len(), 1);
    assert_eq!(checked.reporter.messages()[0].module, "a.b");
    assert_eq!(checked.reporter.messages()[0].text, "Unable to import 'a.d'");
    Ok(())
}
