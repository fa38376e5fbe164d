//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints what the launcher itself has to say: the task header,
//! the resolved launch plan, the task listing and the final outcome. All of it
//! goes to stderr with internationalization support.
//!
//! 此模块打印启动器自身需要输出的内容：任务标题、解析后的启动计划、任务列表和最终结果。
//! 所有内容都输出到 stderr，并支持国际化。

use colored::*;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::core::classpath::display_relative;
use crate::core::error::RunError;
use crate::core::launch::{LaunchPlan, SkipReason};
use crate::core::project::{Build, Project};
use crate::core::target::task_path;
use crate::infra::t;

/// Prints the Gradle-style task header, e.g. `> Task :demo.App.main()`.
pub fn print_task_header(project: &Project, label: &str) {
    eprintln!(
        "{}",
        t!("run.task_header", path = task_path(project.path(), label)).bold()
    );
}

/// Prints why strategies were skipped, the chosen strategy and the resolved classpath.
/// With `dry_run` the full command line is printed as well.
///
/// 打印策略被跳过的原因、所选策略以及解析出的类路径。
/// 当 `dry_run` 为真时，还会打印完整的命令行。
pub fn print_launch_plan(project: &Project, plan: &LaunchPlan, dry_run: bool) {
    for (strategy, reason) in &plan.skipped {
        let message = match reason {
            SkipReason::NoModuleCandidate => t!("run.skip_no_module", strategy = strategy.name()),
            SkipReason::ModuleNotDeclared { candidate, declared } => t!(
                "run.skip_module_not_declared",
                module = candidate,
                declared = declared.as_deref().unwrap_or("-")
            ),
            SkipReason::ModuleNotCompiled { candidate } => {
                t!("run.skip_module_not_compiled", module = candidate)
            }
        };
        eprintln!("{}", message.yellow());
    }

    eprintln!(
        "{}",
        t!(
            "run.strategy",
            strategy = plan.invocation.strategy.name(),
            count = plan.output.runtime_classpath.len()
        )
        .cyan()
    );
    for entry in display_relative(&plan.output.runtime_classpath, project.dir()) {
        eprintln!("    {}", entry.dimmed());
    }

    if dry_run {
        eprintln!("{}", t!("run.dry_run").blue());
        eprintln!("  {}", plan.invocation);
    }
}

/// Prints every registered run task, grouped like `gradle tasks` does.
pub fn print_task_list(build: &Build) {
    let mut groups: BTreeMap<&str, Vec<(String, &str)>> = BTreeMap::new();
    for project in build.projects() {
        for task in project.tasks() {
            groups
                .entry(task.target().group.as_str())
                .or_default()
                .push((task.handle().path(), task.target().description.as_str()));
        }
    }

    eprintln!("\n{}", t!("report.tasks_banner").bold());
    eprintln!("{}", "-".repeat(60));

    if groups.is_empty() {
        eprintln!("{}", t!("report.no_tasks").yellow());
    }
    for (group, tasks) in groups {
        eprintln!("\n{}", t!("report.group_header", group = group).bold());
        for (path, description) in tasks {
            eprintln!("{} - {}", path.green(), description);
        }
    }

    let without_toolchain: Vec<&str> = build
        .projects()
        .iter()
        .filter(|project| project.tasks().next().is_none())
        .map(|project| project.path())
        .collect();
    for path in without_toolchain {
        eprintln!("{}", t!("report.project_without_tasks", path = path).dimmed());
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else {
        format!("{secs:.1}s")
    }
}

/// Prints the final outcome of the run.
///
/// `failure` carries the error that stopped the run, if any; `exit_code` is
/// what the launcher is about to exit with. With `stacktrace` the whole cause
/// chain is printed.
///
/// 打印运行的最终结果。`failure` 为中止运行的错误（如有）；`exit_code` 为启动器即将使用的退出码。
/// 当 `stacktrace` 为真时打印完整的原因链。
pub fn print_outcome(
    failure: Option<&anyhow::Error>,
    exit_code: i32,
    duration: Duration,
    stacktrace: bool,
) {
    let duration = format_duration(duration);

    let Some(error) = failure else {
        if exit_code == 0 {
            eprintln!(
                "\n{}",
                t!("report.successful", duration = duration).green().bold()
            );
        } else {
            eprintln!(
                "\n{}",
                t!("report.child_failed", code = exit_code).red()
            );
            eprintln!("{}", t!("report.failed", duration = duration).red().bold());
        }
        return;
    };

    eprintln!("\n{}", t!("report.failure_banner").red().bold());
    eprintln!("\n{}", t!("report.what_went_wrong").bold());
    match error.downcast_ref::<RunError>() {
        Some(RunError::Launch { diagnostic, .. }) => {
            eprintln!("{}", t!("report.launch_failed", label = error_label(error)));
            eprintln!("{}", diagnostic);
        }
        _ => eprintln!("{:#}", error),
    }

    if stacktrace {
        eprintln!("\n{}", t!("report.exception_is").bold());
        eprintln!("{:?}", error);
    } else {
        eprintln!("\n{}", t!("report.try_stacktrace"));
    }

    eprintln!("\n{}", t!("report.failed", duration = duration).red().bold());
}

fn error_label(error: &anyhow::Error) -> &str {
    error
        .downcast_ref::<RunError>()
        .map(RunError::label)
        .unwrap_or_default()
}
