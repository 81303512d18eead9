// SPDX-License-Identifier: GPL-3.0-or-later

use lintel::exit::{self, ExitSignal};
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> ExitCode {
    // Initialize the logging system.
    env_logger::init();
    // Get the package name and version from Cargo
    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");

    // The run ends by unwinding with the exit signal.
    let arguments: Vec<String> = env::args().skip(1).collect();
    let Err(payload) = panic::catch_unwind(AssertUnwindSafe(move || {
        lintel::run(arguments, None);
    })) else {
        return ExitCode::SUCCESS;
    };
    match ExitSignal::from_payload(payload) {
        Ok(signal) => {
            log::debug!("Exit code: {}", signal.code());
            ExitCode::from(u8::try_from(signal.code()).unwrap_or(u8::MAX))
        }
        Err(payload) => {
            log::error!("Unexpected failure: {}", exit::describe_payload(payload.as_ref()));
            panic::resume_unwind(payload)
        }
    }
}
