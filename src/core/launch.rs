//! # Launch Strategies / 启动策略
//!
//! Turns a run target and its freshly resolved outputs into a process
//! invocation. Strategies are tried in a fixed order: modular execution
//! first, classic classpath execution as the fallback. The first strategy
//! that applies wins.
//!
//! 将运行目标及其刚解析出的输出转换为进程调用。
//! 策略按固定顺序尝试：先模块化执行，再回退到经典类路径执行。第一个适用的策略胜出。

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::core::error::RunError;
use crate::core::outputs::SourceSetOutput;
use crate::core::target::RunTarget;

/// One way of telling the runtime where to find code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStrategy {
    /// `--module-path <outputs> [--patch-module <module>=<resources>] --module <module>/<class>`
    Modular,
    /// `-cp <cp> <class>`
    Classpath,
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: [LaunchStrategy; 2] = [LaunchStrategy::Modular, LaunchStrategy::Classpath];

/// Why a strategy was passed over.
/// 某个策略被跳过的原因。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The class lives in the default package and no module was configured.
    NoModuleCandidate,
    /// The outputs do not declare the module that was asked for.
    ModuleNotDeclared {
        candidate: String,
        declared: Option<String>,
    },
    /// `module-info.java` declares the module but no `module-info.class` was
    /// compiled, so the runtime would not find it.
    ModuleNotCompiled { candidate: String },
}

/// Launcher-wide settings shared by every task of a run.
#[derive(Debug, Clone)]
pub struct LauncherSettings {
    /// The `java` executable / `java` 可执行文件
    pub java: PathBuf,
    /// Working directory of the child, the launcher's own by default / 子进程工作目录
    pub working_dir: PathBuf,
    /// Program arguments appended after the target's own / 追加在目标自身参数之后的程序参数
    pub extra_args: Vec<String>,
}

impl LauncherSettings {
    pub fn new(java: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            java: java.into(),
            working_dir: working_dir.into(),
            extra_args: Vec::new(),
        }
    }
}

/// A fully constructed child process command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub working_dir: PathBuf,
    pub strategy: LaunchStrategy,
}

impl Invocation {
    /// Builds the tokio command. The environment is inherited unmodified.
    pub fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).current_dir(&self.working_dir);
        cmd
    }

    /// The value following `flag`, e.g. the joined classpath after `-cp`.
    pub fn arg_after(&self, flag: &str) -> Option<&OsString> {
        self.args
            .iter()
            .position(|arg| arg == flag)
            .and_then(|pos| self.args.get(pos + 1))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.to_string_lossy();
        let mut words = vec![program.into_owned()];
        words.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));

        let quoted = words
            .iter()
            .map(|word| {
                shlex::try_quote(word)
                    .map(|q| q.into_owned())
                    .unwrap_or_else(|_| word.clone())
            })
            .collect::<Vec<_>>()
            .join(" ");
        f.write_str(&quoted)
    }
}

/// The chosen invocation plus the strategies skipped on the way.
#[derive(Debug, Clone)]
pub struct LaunchPlan {
    pub invocation: Invocation,
    pub skipped: Vec<(LaunchStrategy, SkipReason)>,
    pub output: SourceSetOutput,
}

impl LaunchStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LaunchStrategy::Modular => "module",
            LaunchStrategy::Classpath => "classpath",
        }
    }

    /// Checks whether this strategy applies to `target` with the given outputs.
    pub fn applies(self, target: &RunTarget, output: &SourceSetOutput) -> Result<(), SkipReason> {
        match self {
            LaunchStrategy::Classpath => Ok(()),
            LaunchStrategy::Modular => {
                let candidate = target
                    .module_candidate()
                    .ok_or(SkipReason::NoModuleCandidate)?;
                if output.module_name.as_deref() == Some(candidate) {
                    Ok(())
                } else if output.module_name.is_none()
                    && output.source_module_name.as_deref() == Some(candidate)
                {
                    Err(SkipReason::ModuleNotCompiled {
                        candidate: candidate.to_string(),
                    })
                } else {
                    Err(SkipReason::ModuleNotDeclared {
                        candidate: candidate.to_string(),
                        declared: output.module_name.clone(),
                    })
                }
            }
        }
    }

    /// Builds the argument vector for this strategy.
    /// Callers check [`LaunchStrategy::applies`] first.
    fn build(
        self,
        target: &RunTarget,
        output: &SourceSetOutput,
        settings: &LauncherSettings,
    ) -> Result<Invocation, RunError> {
        let join = |entries: &[PathBuf]| {
            env::join_paths(entries).map_err(|e| {
                RunError::configuration(
                    target.task_label(),
                    format!("classpath entry contains the path separator: {e}"),
                )
            })
        };

        let mut args: Vec<OsString> = target.jvm_args.iter().map(OsString::from).collect();
        match self {
            LaunchStrategy::Modular => {
                let module = target.module_candidate().unwrap_or_default();
                // Resource directories carry no descriptor of their own; they
                // are patched into the module instead of sitting on the path.
                let module_path: Vec<PathBuf> = output
                    .runtime_classpath
                    .entries()
                    .iter()
                    .filter(|entry| !output.resource_dirs.contains(entry))
                    .cloned()
                    .collect();
                args.push("--module-path".into());
                args.push(join(&module_path)?);
                if !output.resource_dirs.is_empty() {
                    let mut patch = OsString::from(format!("{module}="));
                    patch.push(join(&output.resource_dirs)?);
                    args.push("--patch-module".into());
                    args.push(patch);
                }
                args.push("--module".into());
                args.push(format!("{module}/{}", target.class_name()).into());
            }
            LaunchStrategy::Classpath => {
                args.push("-cp".into());
                args.push(join(output.runtime_classpath.entries())?);
                args.push(target.class_name().into());
            }
        }
        args.extend(target.args.iter().map(OsString::from));
        args.extend(settings.extra_args.iter().map(OsString::from));

        Ok(Invocation {
            program: settings.java.clone(),
            args,
            working_dir: settings.working_dir.clone(),
            strategy: self,
        })
    }
}

impl fmt::Display for LaunchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tries [`STRATEGIES`] in order and returns the plan for the first one that applies.
///
/// 按顺序尝试 [`STRATEGIES`]，返回第一个适用策略的启动计划。
pub fn plan(
    target: &RunTarget,
    output: SourceSetOutput,
    settings: &LauncherSettings,
) -> Result<LaunchPlan, RunError> {
    let mut skipped = Vec::new();

    for strategy in STRATEGIES {
        match strategy.applies(target, &output) {
            Ok(()) => {
                let invocation = strategy.build(target, &output, settings)?;
                return Ok(LaunchPlan {
                    invocation,
                    skipped,
                    output,
                });
            }
            Err(reason) => skipped.push((strategy, reason)),
        }
    }

    Err(RunError::launch(
        target.task_label(),
        "no launch strategy applies to this target",
        None,
    ))
}
