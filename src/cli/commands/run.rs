//! # Run Command Module / 运行命令模块
//!
//! Loads the init script, discovers the host build and executes the
//! requested tasks one after another. The first task whose application
//! exits non-zero stops the run, and its code becomes the launcher's.
//!
//! 加载初始化脚本，发现宿主构建，并依次执行请求的任务。
//! 第一个以非零退出的任务会中止运行，其退出码即为启动器的退出码。

use anyhow::{Context, Result};
use colored::*;
use std::env;

use crate::cli::RunArgs;
use crate::core::config::load_init_script;
use crate::core::error::RunError;
use crate::core::launch::LauncherSettings;
use crate::core::project::{Build, Project};
use crate::core::target::TaskSelector;
use crate::infra::{fs, t};
use crate::reporting::{print_launch_plan, print_task_header, print_task_list};

/// Built-in task that lists the registered run tasks.
pub const TASKS_TASK: &str = "tasks";

/// Executes the run command. Returns the exit code of the last application
/// started, or `0` when nothing had to be started.
pub async fn execute(args: &RunArgs) -> Result<i32> {
    let script = load_init_script(&args.init_script)?;
    if !args.explicit_language {
        if let Some(language) = &script.language {
            rust_i18n::set_locale(crate::match_locale(language));
        }
    }
    eprintln!(
        "{}",
        t!("cli.init_script", path = args.init_script.display()).dimmed()
    );

    let build = Build::discover(&args.project_dir, &script)?;

    if args.tasks.is_empty() {
        eprintln!("{}", t!("cli.no_tasks_given").yellow());
        return Ok(0);
    }

    let root_dir = fs::absolute_path(&args.project_dir)?;
    let java = fs::resolve_java_executable(script.java.executable.as_deref(), &root_dir)?;
    let working_dir = env::current_dir().context("Failed to read the current directory")?;
    let mut settings = LauncherSettings::new(java, working_dir);
    settings.extra_args = args.extra_args.clone();

    for task in &args.tasks {
        if is_tasks_task(task) {
            print_task_list(&build);
            continue;
        }

        let selector: TaskSelector = task.parse()?;
        for project in build.select(&selector)? {
            let code = run_task(project, selector.label(), &settings, args.dry_run).await?;
            if code != 0 {
                return Ok(code);
            }
        }
    }

    Ok(0)
}

fn is_tasks_task(task: &str) -> bool {
    task.trim_start_matches(':') == TASKS_TASK
}

async fn run_task(
    project: &Project,
    label: &str,
    settings: &LauncherSettings,
    dry_run: bool,
) -> Result<i32, RunError> {
    print_task_header(project, label);
    if dry_run {
        let plan = project.prepare(label, settings)?;
        print_launch_plan(project, &plan, true);
        return Ok(0);
    }
    project
        .execute_with(label, settings, |plan| print_launch_plan(project, plan, false))
        .await
}
