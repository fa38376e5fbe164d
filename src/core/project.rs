//! # Host Build Model / 宿主构建模型
//!
//! A [`Build`] is the root project plus the subprojects the init script
//! includes. Each [`Project`] carries the toolchain capabilities detected for
//! it, a registry slot the toolchain fills once it has finished wiring, and
//! the run tasks registered against it.
//!
//! Registration happens during discovery, before any registry exists; the
//! registry is only consulted when a task executes.
//!
//! [`Build`] 由根项目以及初始化脚本包含的子项目组成。每个 [`Project`] 携带为其检测到的工具链能力、
//! 一个在工具链完成装配后填充的注册表槽位，以及注册在其上的运行任务。
//! 注册发生在发现阶段，此时注册表尚不存在；只有在任务执行时才会查询注册表。

use anyhow::{Context, Result, bail};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::core::classpath::{self, ClasspathResolver, RegistrySlot};
use crate::core::config::InitScript;
use crate::core::error::RunError;
use crate::core::launch::{self, LaunchPlan, LauncherSettings};
use crate::core::outputs::{self, FsOutputRegistry, Layout, OutputRegistry};
use crate::core::target::{RunTarget, TaskSelector, task_path};
use crate::infra::{fs, process};

/// Capability name of the JVM toolchain.
pub const JAVA_CAPABILITY: &str = "java";

/// Identifies a registered task. Cheap to clone and compare.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle {
    pub project: String,
    pub label: String,
}

impl TaskHandle {
    /// The printable task path, e.g. `:app:demo.App.main()`.
    pub fn path(&self) -> String {
        task_path(&self.project, &self.label)
    }
}

/// A registered run task: the target plus its deferred classpath resolver.
pub struct Task {
    handle: TaskHandle,
    target: RunTarget,
    resolver: ClasspathResolver,
}

impl Task {
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    pub fn target(&self) -> &RunTarget {
        &self.target
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("handle", &self.handle)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// One project of the host build.
/// 宿主构建中的一个项目。
pub struct Project {
    path: String,
    dir: PathBuf,
    capabilities: BTreeSet<String>,
    registry: RegistrySlot,
    tasks: BTreeMap<String, Task>,
}

impl Project {
    pub fn new(path: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dir: dir.into(),
            capabilities: BTreeSet::new(),
            registry: Arc::new(RwLock::new(None)),
            tasks: BTreeMap::new(),
        }
    }

    pub fn with_capability(mut self, name: &str) -> Self {
        self.add_capability(name);
        self
    }

    pub fn add_capability(&mut self, name: &str) {
        self.capabilities.insert(name.to_string());
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Installs the compiled-output registry. Tasks registered earlier see it
    /// on their next execution.
    pub fn attach_registry(&self, registry: Arc<dyn OutputRegistry>) {
        *self
            .registry
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(registry);
    }

    pub fn has_registry(&self) -> bool {
        self.registry
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some()
    }

    /// Registers a run task for `target`.
    ///
    /// Returns `None` without registering anything when the project lacks the
    /// Java toolchain capability. Registering a label twice returns the
    /// handle of the existing task.
    ///
    /// 为 `target` 注册运行任务。项目缺少 Java 工具链能力时返回 `None` 且不注册任何内容。
    /// 重复注册同一标签会返回已有任务的句柄。
    pub fn register(&mut self, target: RunTarget) -> Option<TaskHandle> {
        if !self.has_capability(JAVA_CAPABILITY) {
            return None;
        }

        let label = target.task_label().to_string();
        if let Some(existing) = self.tasks.get(&label) {
            return Some(existing.handle.clone());
        }

        let handle = TaskHandle {
            project: self.path.clone(),
            label: label.clone(),
        };
        let resolver = classpath::deferred(self.registry.clone(), &label, &target.source_set);
        self.tasks.insert(
            label,
            Task {
                handle: handle.clone(),
                target,
                resolver,
            },
        );
        Some(handle)
    }

    pub fn task(&self, label: &str) -> Option<&Task> {
        self.tasks.get(label)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    fn require_task(&self, label: &str) -> Result<&Task, RunError> {
        self.tasks.get(label).ok_or_else(|| {
            let reason = if self.has_capability(JAVA_CAPABILITY) {
                format!("task '{label}' is not registered in project '{}'", self.path)
            } else {
                format!(
                    "project '{}' has no '{JAVA_CAPABILITY}' toolchain, so no compiled-output registry exists",
                    self.path
                )
            };
            RunError::configuration(label, reason)
        })
    }

    /// Resolves the task's classpath now and picks a launch strategy,
    /// without starting anything.
    pub fn prepare(&self, label: &str, settings: &LauncherSettings) -> Result<LaunchPlan, RunError> {
        let task = self.require_task(label)?;
        let output = (task.resolver)()?;
        launch::plan(&task.target, output, settings)
    }

    /// Runs the task: resolves, plans, spawns exactly one child and waits for it.
    /// Returns the child's exit code.
    ///
    /// 运行任务：解析、规划、启动恰好一个子进程并等待其结束。返回子进程的退出码。
    pub async fn execute(&self, label: &str, settings: &LauncherSettings) -> Result<i32, RunError> {
        self.execute_with(label, settings, |_| {}).await
    }

    /// [`Project::execute`], handing the chosen plan to `before_launch` right
    /// before the child is spawned.
    pub async fn execute_with(
        &self,
        label: &str,
        settings: &LauncherSettings,
        before_launch: impl FnOnce(&LaunchPlan),
    ) -> Result<i32, RunError> {
        let plan = self.prepare(label, settings)?;
        before_launch(&plan);
        process::run(&plan.invocation, label).await
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("path", &self.path)
            .field("dir", &self.dir)
            .field("capabilities", &self.capabilities)
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// The root project and its included subprojects, in declaration order.
#[derive(Debug)]
pub struct Build {
    projects: Vec<Project>,
}

impl Build {
    pub fn new(projects: Vec<Project>) -> Self {
        Self { projects }
    }

    /// Discovers the build rooted at `root_dir` and applies the init script to
    /// every project, mirroring `allprojects { plugins.withId("java") { ... } }`.
    pub fn discover(root_dir: &Path, script: &InitScript) -> Result<Self> {
        let root_dir = fs::absolute_path(root_dir)?;
        let targets = script
            .targets
            .iter()
            .map(|spec| spec.to_target())
            .collect::<Result<Vec<_>, _>>()?;

        let mut project_dirs = vec![(":".to_string(), root_dir.clone())];
        for include in &script.build.include {
            let trimmed = include.trim().trim_start_matches(':');
            if trimmed.is_empty() {
                bail!("Invalid project path in build.include: '{include}'");
            }
            let path = format!(":{trimmed}");
            if project_dirs.iter().any(|(known, _)| *known == path) {
                continue;
            }
            let dir = trimmed
                .split(':')
                .fold(root_dir.clone(), |dir, segment| dir.join(segment));
            if !fs::is_directory(&dir) {
                bail!(
                    "Included project '{}' does not exist at {}",
                    include,
                    dir.display()
                );
            }
            project_dirs.push((path, dir));
        }

        let mut projects = Vec::with_capacity(project_dirs.len());
        for (path, dir) in project_dirs {
            let mut project = Project::new(path, dir.clone());
            if outputs::has_jvm_sources(&dir) {
                project.add_capability(JAVA_CAPABILITY);
            }
            for capability in &script.build.capabilities {
                project.add_capability(capability);
            }

            for target in &targets {
                project.register(target.clone());
            }

            // The toolchain finishes wiring its registry after registration.
            if project.has_capability(JAVA_CAPABILITY) {
                let layout = script
                    .build
                    .layout
                    .or_else(|| Layout::detect(&dir))
                    .unwrap_or_default();
                let lib_dirs = expand_all(&script.build.lib_dirs, &dir)?;
                let extra = expand_all(&script.build.extra_classpath, &dir)?;
                let registry = FsOutputRegistry::new(&dir, layout)
                    .with_lib_dirs(lib_dirs)
                    .with_extra_classpath(extra);
                project.attach_registry(Arc::new(registry));
            }

            projects.push(project);
        }

        Ok(Self { projects })
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, path: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.path == path)
    }

    /// Projects that should run the selected task, in project order.
    pub fn select(&self, selector: &TaskSelector) -> Result<Vec<&Project>, RunError> {
        match selector {
            TaskSelector::Qualified { project, label } => {
                let project = self.project(project).ok_or_else(|| {
                    RunError::configuration(
                        label.as_str(),
                        format!("project '{project}' not found in this build"),
                    )
                })?;
                // Execution reports why the task is missing, capability included.
                Ok(vec![project])
            }
            TaskSelector::Unqualified(label) => {
                let matching: Vec<&Project> = self
                    .projects
                    .iter()
                    .filter(|project| project.task(label).is_some())
                    .collect();
                if matching.is_empty() {
                    let root = self.projects.first().ok_or_else(|| {
                        RunError::configuration(label.as_str(), "the build has no projects")
                    })?;
                    // Let the root project explain what is missing.
                    return Ok(vec![root]);
                }
                Ok(matching)
            }
        }
    }
}

fn expand_all(raw: &[String], base: &Path) -> Result<Vec<PathBuf>> {
    raw.iter()
        .map(|entry| {
            fs::expand_path(entry, base)
                .with_context(|| format!("Invalid classpath setting '{entry}'"))
        })
        .collect()
}
