//! # Classpath Resolution / 类路径解析
//!
//! The runtime classpath is an ordered list of output directories and archives.
//! It is never computed when a task is registered: registration captures a
//! [`ClasspathResolver`] that queries the project's compiled-output registry
//! each time the task executes.
//!
//! 运行时类路径是输出目录和归档文件的有序列表。
//! 注册任务时从不计算它：注册时捕获一个 [`ClasspathResolver`]，
//! 每次任务执行时才查询项目的编译输出注册表。

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::core::error::RunError;
use crate::core::outputs::{OutputRegistry, SourceSetOutput};

/// An ordered, duplicate-free sequence of classpath entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classpath {
    entries: Vec<PathBuf>,
}

impl Classpath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry unless it is already present.
    pub fn push(&mut self, entry: impl Into<PathBuf>) {
        let entry = entry.into();
        if !self.entries.contains(&entry) {
            self.entries.push(entry);
        }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Joins the entries with the platform path separator (`:` or `;`).
    pub fn to_os_string(&self) -> Result<OsString, env::JoinPathsError> {
        env::join_paths(&self.entries)
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for Classpath {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut classpath = Classpath::new();
        classpath.extend(iter);
        classpath
    }
}

impl<P: Into<PathBuf>> Extend<P> for Classpath {
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let joined = self
            .entries
            .iter()
            .map(|entry| entry.display().to_string())
            .collect::<Vec<_>>()
            .join(separator);
        f.write_str(&joined)
    }
}

impl AsRef<[PathBuf]> for Classpath {
    fn as_ref(&self) -> &[PathBuf] {
        &self.entries
    }
}

/// Where a project keeps its compiled-output registry once the toolchain has
/// finished wiring it. Empty until then, and forever for projects without the
/// toolchain capability.
///
/// 项目在工具链完成装配后存放其编译输出注册表的位置。
pub type RegistrySlot = Arc<RwLock<Option<Arc<dyn OutputRegistry>>>>;

/// A deferred classpath computation, invoked on every execution and never memoized.
/// 延迟的类路径计算，每次执行时调用，从不缓存。
pub type ClasspathResolver = Box<dyn Fn() -> Result<SourceSetOutput, RunError> + Send + Sync>;

/// Captures everything needed to resolve `source_set` later, without touching
/// the registry now.
pub fn deferred(slot: RegistrySlot, label: &str, source_set: &str) -> ClasspathResolver {
    let label = label.to_string();
    let source_set = source_set.to_string();

    Box::new(move || {
        let registry = slot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| {
                RunError::configuration(
                    &label,
                    "the project has no compiled-output registry (is the Java toolchain applied?)",
                )
            })?;

        registry
            .source_set(&source_set)
            .map_err(|e| RunError::configuration(&label, format!("{e:#}")))
    })
}

/// Renders classpath entries relative to `base` where possible, for display.
pub fn display_relative(classpath: &Classpath, base: &Path) -> Vec<String> {
    classpath
        .entries()
        .iter()
        .map(|entry| {
            entry
                .strip_prefix(base)
                .unwrap_or(entry)
                .display()
                .to_string()
        })
        .collect()
}
