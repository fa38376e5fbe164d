//! # Init Script / 初始化脚本
//!
//! The init script is a TOML file selected with `-I`. It declares the run
//! targets to register in every project, plus a few settings about how the
//! host build is laid out.
//!
//! 初始化脚本是通过 `-I` 选择的 TOML 文件。它声明要在每个项目中注册的运行目标，
//! 以及关于宿主构建布局的一些设置。
//!
//! ```toml
//! language = "en"
//!
//! [build]
//! include = ["app"]
//! lib_dirs = ["build/dependencies"]
//!
//! [java]
//! executable = "$JAVA_HOME/bin/java"
//!
//! [[targets]]
//! class = "com.campasian.CampasianApplication"
//! module = "com.campasian"
//! jvm_args = ["-Xmx512m"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::RunError;
use crate::core::outputs::Layout;
use crate::core::target::{DEFAULT_GROUP, DEFAULT_SOURCE_SET, RunTarget};

/// Default file name looked up when `-I` is not given.
pub const DEFAULT_INIT_SCRIPT: &str = "run.init.toml";

/// A run target as written in the init script.
/// 初始化脚本中书写的运行目标。
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TargetSpec {
    /// Fully-qualified class with the `main()` method.
    pub class: String,
    /// Module to try first; defaults to the class's package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_source_set")]
    pub source_set: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub jvm_args: Vec<String>,
}

fn default_source_set() -> String {
    DEFAULT_SOURCE_SET.to_string()
}

impl TargetSpec {
    pub fn to_target(&self) -> Result<RunTarget, RunError> {
        let mut target = RunTarget::new(self.module.as_deref(), &self.class)?;
        target.group = self
            .group
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP.to_string());
        if let Some(description) = &self.description {
            target.description = description.clone();
        }
        target.source_set = self.source_set.clone();
        target.args = self.args.clone();
        target.jvm_args = self.jvm_args.clone();
        Ok(target)
    }
}

/// How the host build is organised.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct BuildSettings {
    /// Subproject paths such as `app` or `libs:core`.
    #[serde(default)]
    pub include: Vec<String>,
    /// Capabilities forced on every project, on top of detection.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Output layout; detected per project when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Directories whose jars are appended to the runtime classpath.
    #[serde(default)]
    pub lib_dirs: Vec<String>,
    /// Entries appended verbatim after the jars.
    #[serde(default)]
    pub extra_classpath: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct JavaSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
}

/// The whole init script.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InitScript {
    /// The language for the launcher's own messages (e.g., "en", "zh-CN").
    /// 启动器自身消息的语言（例如 "en", "zh-CN"）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub build: BuildSettings,
    #[serde(default)]
    pub java: JavaSettings,
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

impl InitScript {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse init script")
    }
}

/// Reads and parses the init script at `path`.
pub fn load_init_script(path: &Path) -> Result<InitScript> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read init script: {}", path.display()))?;
    InitScript::parse(&content).with_context(|| format!("Invalid init script: {}", path.display()))
}
