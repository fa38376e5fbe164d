// src/cli.rs
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::{env, path::PathBuf, time::Instant};

use crate::core::config::DEFAULT_INIT_SCRIPT;
use crate::core::error::{LAUNCHER_FAILURE, RunError};
use crate::infra::t;
use crate::reporting;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for `--lang <VALUE>` or `--lang=<VALUE>`.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        return args.get(pos + 1).cloned();
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang=").map(str::to_string))
}

pub fn build_cli(locale: &str) -> Command {
    Command::new("main-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("init-script")
                .short('I')
                .long("init-script")
                .help(t!("arg_init_script", locale = locale).to_string())
                .value_name("FILE")
                .default_value(DEFAULT_INIT_SCRIPT)
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("project-dir")
                .short('p')
                .long("project-dir")
                .help(t!("arg_project_dir", locale = locale).to_string())
                .value_name("PROJECT_DIR")
                .default_value(".")
                .value_parser(clap::value_parser!(PathBuf))
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("stacktrace")
                .short('s')
                .long("stacktrace")
                .help(t!("arg_stacktrace", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .short('m')
                .long("dry-run")
                .help(t!("arg_dry_run", locale = locale).to_string())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .long("args")
                .help(t!("arg_args", locale = locale).to_string())
                .value_name("ARGS")
                .allow_hyphen_values(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("tasks")
                .help(t!("arg_tasks", locale = locale).to_string())
                .value_name("TASK")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Everything the run command needs from the command line.
/// 运行命令从命令行获取的全部参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    pub init_script: PathBuf,
    pub project_dir: PathBuf,
    pub stacktrace: bool,
    pub dry_run: bool,
    /// `--args`, already split shell-style / 已按 shell 规则拆分的 `--args`
    pub extra_args: Vec<String>,
    pub tasks: Vec<String>,
    /// Whether `--lang` was given, which overrides the init script's language.
    pub explicit_language: bool,
}

impl RunArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let extra_args = match matches.get_one::<String>("args") {
            Some(raw) => shlex::split(raw)
                .with_context(|| format!("Unbalanced quotes in --args: {raw}"))?,
            None => Vec::new(),
        };

        Ok(Self {
            init_script: matches
                .get_one::<PathBuf>("init-script")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INIT_SCRIPT)),
            project_dir: matches
                .get_one::<PathBuf>("project-dir")
                .cloned()
                .unwrap_or_else(|| PathBuf::from(".")),
            stacktrace: matches.get_flag("stacktrace"),
            dry_run: matches.get_flag("dry-run"),
            extra_args,
            tasks: matches
                .get_many::<String>("tasks")
                .map(|tasks| tasks.cloned().collect())
                .unwrap_or_default(),
            explicit_language: matches.get_one::<String>("lang").is_some(),
        })
    }
}

/// Maps the outcome of a run onto the launcher's exit code.
///
/// A child's exit code is passed through unchanged. Launcher failures exit
/// with [`LAUNCHER_FAILURE`] unless the runtime itself reported a code.
///
/// 将运行结果映射为启动器的退出码。子进程的退出码原样传递；
/// 启动器自身的失败使用 [`LAUNCHER_FAILURE`]，除非运行时自己报告了退出码。
pub fn exit_code_for(outcome: &Result<i32>) -> i32 {
    match outcome {
        Ok(code) => *code,
        Err(error) => error
            .downcast_ref::<RunError>()
            .map(RunError::exit_code)
            .unwrap_or(i32::from(LAUNCHER_FAILURE)),
    }
}

/// Narrows an exit code to what a process can return. Codes outside
/// `0..=255` (Windows NTSTATUS values, for one) become `1`.
pub fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

pub async fn run() -> u8 {
    // Pre-parse language and initialize i18n first.
    match pre_parse_language() {
        Some(language) => rust_i18n::set_locale(crate::match_locale(&language)),
        None => crate::init(),
    }
    let locale = rust_i18n::locale().to_string();

    let matches = build_cli(&locale).get_matches();
    let started = Instant::now();

    let args = match RunArgs::from_matches(&matches) {
        Ok(args) => args,
        Err(error) => {
            reporting::print_outcome(
                Some(&error),
                i32::from(LAUNCHER_FAILURE),
                started.elapsed(),
                matches.get_flag("stacktrace"),
            );
            return LAUNCHER_FAILURE;
        }
    };

    let outcome = commands::run::execute(&args).await;
    let code = exit_code_for(&outcome);
    reporting::print_outcome(outcome.as_ref().err(), code, started.elapsed(), args.stacktrace);
    exit_byte(code)
}
