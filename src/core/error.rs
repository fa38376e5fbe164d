//! # Run Errors / 运行错误
//!
//! The launcher fails in exactly two ways: the run could not be configured,
//! or the runtime could not start the entry point. Both are terminal for the
//! current invocation.
//!
//! 启动器只有两种失败方式：运行无法配置，或运行时无法启动入口点。
//! 两者对当前调用都是终止性的。

use thiserror::Error;

/// Exit status returned when the launcher fails before any child process
/// exists. Same convention as `docker run`: 125 means "the launcher itself failed".
///
/// 当启动器在任何子进程存在之前失败时返回的退出状态。
pub const LAUNCHER_FAILURE: u8 = 125;

#[derive(Error, Debug)]
pub enum RunError {
    /// The toolchain capability, its compiled-output registry or the outputs
    /// themselves are unavailable for the task.
    #[error("Could not configure task '{label}': {reason}")]
    Configuration { label: String, reason: String },

    /// A process was attempted but the runtime could not locate or execute
    /// the entry point. `diagnostic` is the runtime's own text, unmodified.
    #[error("Could not launch task '{label}':\n{diagnostic}")]
    Launch {
        label: String,
        diagnostic: String,
        exit_code: Option<i32>,
    },
}

impl RunError {
    pub fn configuration(label: impl Into<String>, reason: impl Into<String>) -> Self {
        RunError::Configuration {
            label: label.into(),
            reason: reason.into(),
        }
    }

    pub fn launch(
        label: impl Into<String>,
        diagnostic: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        RunError::Launch {
            label: label.into(),
            diagnostic: diagnostic.into(),
            exit_code,
        }
    }

    /// The label of the task that failed.
    pub fn label(&self) -> &str {
        match self {
            RunError::Configuration { label, .. } | RunError::Launch { label, .. } => label,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RunError::Configuration { .. })
    }

    pub fn is_launch(&self) -> bool {
        matches!(self, RunError::Launch { .. })
    }

    /// The process exit status this error maps to.
    /// A launch failure reported by a running child keeps the child's status;
    /// everything else is [`LAUNCHER_FAILURE`].
    ///
    /// 此错误映射到的进程退出状态。
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Launch {
                exit_code: Some(code),
                ..
            } => *code,
            _ => i32::from(LAUNCHER_FAILURE),
        }
    }
}
