// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod checkers;
pub mod config;
pub mod context;
pub mod environment;
pub mod exit;
pub mod lint;
pub mod message;
pub mod modules;
pub mod reporter;
pub mod source;
pub mod stats;
pub mod streams;
pub mod syntax;

pub use lint::{Linter, run};
