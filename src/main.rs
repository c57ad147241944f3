//   Copyright 2025 TinyScript Verifier Contributors
//
//   Licensed under the Apache License, Version 2.0 (the "License");
//   you may not use this file except in compliance with the License.
//   You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
//   Unless required by applicable law or agreed to in writing, software
//   distributed under the License is distributed on an "AS IS" BASIS,
//   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//   See the License for the specific language governing permissions and
//   limitations under the License.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anstyle::Style;
use clap::{
    builder::styling::{AnsiColor, Color},
    error::ErrorKind,
    Parser, Subcommand, ValueEnum,
};
use libtinyscript::policy::{defuse, runtime, taint};
use libtinyscript::{parser, CheckResult};
use thiserror::Error;

/// Bounded symbolic verifier for TinyScript programs.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a program against a safety policy.
    Check {
        /// Safety policy to check the program against.
        policy: Policy,

        /// Path to the TinyScript source file.
        file: PathBuf,

        /// Loop-unrolling depth.
        #[arg(long, default_value_t = 1)]
        depth: u32,

        /// Solver wall-clock timeout, in seconds.
        #[arg(long, default_value_t = 10.0)]
        timeout: f64,

        /// Elementary step budget (runtime policy only).
        #[arg(long = "step-bound", default_value_t = 100)]
        step_bound: u64,

        /// Prefix identifying tainted source variables (taint policy only).
        #[arg(long = "source-prefix", default_value = "sec_")]
        source_prefix: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Policy {
    Runtime,
    Defuse,
    Taint,
}

#[derive(Debug, Error)]
enum Error {
    #[error("failed to read input file: {0}")]
    ReadFile(std::io::Error),

    #[error("{0}")]
    Parse(#[from] libtinyscript::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::from(0);
        }
        Err(err) => {
            // clap's own usage-error exit code (2) collides with this
            // tool's `Unknown` verdict code; report malformed invocations
            // as usage errors (64) instead of letting clap exit on its own.
            let _ = err.print();
            return ExitCode::from(64);
        }
    };

    match run(&args) {
        Ok(result) => {
            print_result(result);
            match result {
                CheckResult::Satisfies => ExitCode::from(0),
                CheckResult::Violates => ExitCode::from(1),
                CheckResult::Unknown => ExitCode::from(2),
            }
        }
        Err(err @ Error::ReadFile(_)) => {
            eprintln!("{err}");
            ExitCode::from(64)
        }
        Err(err @ Error::Parse(_)) => {
            eprintln!("{err}");
            ExitCode::from(65)
        }
    }
}

fn run(args: &Args) -> Result<CheckResult, Error> {
    let Command::Check {
        policy,
        file,
        depth,
        timeout,
        step_bound,
        source_prefix,
    } = &args.command;

    let source = std::fs::read_to_string(file).map_err(Error::ReadFile)?;
    let program = parser::parse_source(&source)?;
    let timeout = Duration::from_secs_f64(timeout.max(0.0));

    let result = match policy {
        Policy::Runtime => runtime::symbolic_check(&program, *step_bound, *depth, timeout),
        Policy::Defuse => defuse::symbolic_check(&program, *depth, timeout),
        Policy::Taint => taint::symbolic_check(&program, source_prefix, *depth, timeout),
    };

    tracing::debug!(?result, ?policy, depth, "checked program");
    Ok(result)
}

fn print_result(result: CheckResult) {
    let mut out = std::io::stdout().lock();
    let style_none = Style::new();
    let style = match out.is_terminal() {
        true => match result {
            CheckResult::Satisfies => Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))),
            CheckResult::Violates => Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red))),
            CheckResult::Unknown => Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        },
        false => style_none,
    };
    write!(&mut out, "{style}").expect("write to stdout");
    println!("{result}");
    style.write_reset_to(&mut out).expect("reset stdout colour");
}
