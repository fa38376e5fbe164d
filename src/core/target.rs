//! # Run Targets / 运行目标
//!
//! A [`RunTarget`] is what an IDE run configuration points at: a class with a
//! `main()` method, optionally inside a named module. Its task label is derived
//! from the class name alone, so the same target always yields the same label.
//!
//! [`RunTarget`] 即 IDE 运行配置所指向的对象：一个带有 `main()` 方法的类，
//! 可选地位于某个命名模块中。其任务标签仅由类名派生，因此同一目标总是产生相同的标签。

use std::fmt;
use std::str::FromStr;

use crate::core::error::RunError;

/// Suffix appended to the class name to form the task label.
pub const MAIN_SUFFIX: &str = ".main()";
/// Group used for task listings when the init script does not name one.
pub const DEFAULT_GROUP: &str = "application";
/// Source set whose outputs are launched by default.
pub const DEFAULT_SOURCE_SET: &str = "main";

/// A single runnable `main()` entry point.
/// 一个可运行的 `main()` 入口点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunTarget {
    module_name: Option<String>,
    class_name: String,
    task_label: String,
    /// Task group shown in listings / 任务列表中显示的分组
    pub group: String,
    /// Human readable task description / 人类可读的任务描述
    pub description: String,
    /// Source set whose runtime classpath is launched / 要启动其运行时类路径的源集
    pub source_set: String,
    /// Program arguments passed after the class / 传递在类名之后的程序参数
    pub args: Vec<String>,
    /// Arguments for the JVM itself / JVM 自身的参数
    pub jvm_args: Vec<String>,
}

impl RunTarget {
    /// Creates a target for `class_name`, optionally pinned to `module_name`.
    ///
    /// Fails with a configuration error when either name is not a
    /// dot-separated sequence of Java identifiers.
    pub fn new(module_name: Option<&str>, class_name: &str) -> Result<Self, RunError> {
        let class_name = class_name.trim();
        if !is_qualified_name(class_name) {
            return Err(RunError::configuration(
                format!("{class_name}{MAIN_SUFFIX}"),
                format!("'{class_name}' is not a fully-qualified class name"),
            ));
        }
        let task_label = format!("{class_name}{MAIN_SUFFIX}");

        let module_name = match module_name.map(str::trim) {
            Some(module) if !is_qualified_name(module) => {
                return Err(RunError::configuration(
                    task_label,
                    format!("'{module}' is not a valid module name"),
                ));
            }
            other => other.map(str::to_string),
        };

        Ok(Self {
            description: format!("Runs {task_label} like an IDE run configuration"),
            module_name,
            class_name: class_name.to_string(),
            task_label,
            group: DEFAULT_GROUP.to_string(),
            source_set: DEFAULT_SOURCE_SET.to_string(),
            args: Vec::new(),
            jvm_args: Vec::new(),
        })
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    pub fn task_label(&self) -> &str {
        &self.task_label
    }

    /// The package the class lives in, `None` for the default package.
    pub fn package(&self) -> Option<&str> {
        self.class_name.rsplit_once('.').map(|(package, _)| package)
    }

    /// The module name tried first when launching: the configured module,
    /// or else the class's package root.
    ///
    /// 启动时首先尝试的模块名：已配置的模块，否则为类所在的包。
    pub fn module_candidate(&self) -> Option<&str> {
        self.module_name().or_else(|| self.package())
    }
}

impl fmt::Display for RunTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module_name {
            Some(module) => write!(f, "{module}/{}", self.class_name),
            None => f.write_str(&self.class_name),
        }
    }
}

fn is_java_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Checks for a non-empty, dot-separated sequence of Java identifiers.
/// 检查是否为非空的、以点分隔的 Java 标识符序列。
pub fn is_qualified_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_java_identifier)
}

/// A task requested on the command line.
///
/// `:app:demo.App.main()` selects one project, `:demo.App.main()` the root
/// project, and a bare `demo.App.main()` every project that registered it.
///
/// 命令行上请求的任务。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskSelector {
    Qualified { project: String, label: String },
    Unqualified(String),
}

impl TaskSelector {
    pub fn label(&self) -> &str {
        match self {
            TaskSelector::Qualified { label, .. } | TaskSelector::Unqualified(label) => label,
        }
    }
}

impl FromStr for TaskSelector {
    type Err = RunError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        if !input.contains(':') {
            if input.is_empty() {
                return Err(RunError::configuration(input, "empty task name"));
            }
            return Ok(TaskSelector::Unqualified(input.to_string()));
        }

        let (project, label) = input
            .rsplit_once(':')
            .unwrap_or(("", input));
        if label.is_empty() {
            return Err(RunError::configuration(
                input,
                "task path does not end with a task name",
            ));
        }
        let project = project.trim_start_matches(':');
        Ok(TaskSelector::Qualified {
            project: format!(":{project}"),
            label: label.to_string(),
        })
    }
}

impl fmt::Display for TaskSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskSelector::Qualified { project, label } => f.write_str(&task_path(project, label)),
            TaskSelector::Unqualified(label) => f.write_str(label),
        }
    }
}

/// Joins a project path and a task label the way task paths are printed.
pub fn task_path(project: &str, label: &str) -> String {
    if project == ":" {
        format!(":{label}")
    } else {
        format!("{project}:{label}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_derived_from_class_name() {
        let target = RunTarget::new(Some("com.campasian"), "com.campasian.CampasianApplication")
            .unwrap();
        assert_eq!(target.task_label(), "com.campasian.CampasianApplication.main()");
        assert_eq!(target.module_candidate(), Some("com.campasian"));

        let again = RunTarget::new(None, "com.campasian.CampasianApplication").unwrap();
        assert_eq!(again.task_label(), target.task_label());
    }

    #[test]
    fn module_candidate_falls_back_to_package() {
        let target = RunTarget::new(None, "demo.App").unwrap();
        assert_eq!(target.module_candidate(), Some("demo"));

        let default_package = RunTarget::new(None, "App").unwrap();
        assert_eq!(default_package.module_candidate(), None);
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(RunTarget::new(None, "").is_err());
        assert!(RunTarget::new(None, "demo..App").is_err());
        assert!(RunTarget::new(None, "1demo.App").is_err());
        assert!(RunTarget::new(Some("bad module"), "demo.App").is_err());
        assert!(RunTarget::new(None, "demo.$Inner_1").is_ok());
    }

    #[test]
    fn parses_task_selectors() {
        let root: TaskSelector = ":demo.App.main()".parse().unwrap();
        assert_eq!(
            root,
            TaskSelector::Qualified {
                project: ":".into(),
                label: "demo.App.main()".into()
            }
        );

        let nested: TaskSelector = ":libs:core:demo.App.main()".parse().unwrap();
        assert_eq!(
            nested,
            TaskSelector::Qualified {
                project: ":libs:core".into(),
                label: "demo.App.main()".into()
            }
        );
        assert_eq!(nested.to_string(), ":libs:core:demo.App.main()");

        let relative: TaskSelector = "app:demo.App.main()".parse().unwrap();
        assert_eq!(
            relative,
            TaskSelector::Qualified {
                project: ":app".into(),
                label: "demo.App.main()".into()
            }
        );

        let bare: TaskSelector = "demo.App.main()".parse().unwrap();
        assert_eq!(bare, TaskSelector::Unqualified("demo.App.main()".into()));

        assert!(":app:".parse::<TaskSelector>().is_err());
        assert!("".parse::<TaskSelector>().is_err());
    }
}
