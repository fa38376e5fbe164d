//! # Compiled-Output Registry / 编译输出注册表
//!
//! The registry answers one question: where did the build put the compiled
//! outputs of a source set, and what is that source set's runtime classpath?
//! [`FsOutputRegistry`] answers it from the standard Gradle and Maven layouts
//! already on disk. It never builds anything.
//!
//! 注册表只回答一个问题：构建把某个源集的编译输出放在了哪里，该源集的运行时类路径是什么？
//! [`FsOutputRegistry`] 根据磁盘上已有的标准 Gradle 和 Maven 布局来回答，从不执行构建。

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::classpath::Classpath;
use crate::core::descriptor;
use crate::infra::fs;

/// The registry's answer for one source set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSetOutput {
    /// Source set name, e.g. `main` / 源集名称，例如 `main`
    pub name: String,
    /// Output directories first, then dependency archives / 先是输出目录，然后是依赖归档
    pub runtime_classpath: Classpath,
    /// Processed resource directories, also part of `runtime_classpath` / 处理后的资源目录，同样位于 `runtime_classpath` 中
    pub resource_dirs: Vec<PathBuf>,
    /// Module declared by a compiled `module-info.class` / 编译后的 `module-info.class` 声明的模块
    pub module_name: Option<String>,
    /// Module declared by `module-info.java`, whether or not it was compiled.
    /// Only used to explain why a modular launch was skipped.
    pub source_module_name: Option<String>,
}

/// The host's record of where build artifacts were written.
/// 宿主对构建产物写入位置的记录。
pub trait OutputRegistry: Send + Sync {
    /// Resolves `name` against the outputs as they are right now.
    fn source_set(&self, name: &str) -> Result<SourceSetOutput>;
}

/// On-disk conventions of the build tool that produced the outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Gradle,
    Maven,
}

const GRADLE_SCRIPTS: [&str; 2] = ["build.gradle", "build.gradle.kts"];
const MAVEN_POM: &str = "pom.xml";
const JVM_LANGUAGES: [&str; 2] = ["java", "kotlin"];

impl Layout {
    /// Guesses the layout from the build files in `dir`.
    /// Gradle wins when both build files are present.
    pub fn detect(dir: &Path) -> Option<Layout> {
        if GRADLE_SCRIPTS.iter().any(|script| dir.join(script).is_file()) {
            Some(Layout::Gradle)
        } else if dir.join(MAVEN_POM).is_file() {
            Some(Layout::Maven)
        } else {
            None
        }
    }

    /// Directories holding compiled classes for `source_set`.
    pub fn class_dirs(self, project_dir: &Path, source_set: &str) -> Vec<PathBuf> {
        match self {
            Layout::Gradle => JVM_LANGUAGES
                .iter()
                .map(|lang| project_dir.join("build").join("classes").join(lang).join(source_set))
                .collect(),
            Layout::Maven => {
                let dir = match source_set {
                    "main" => "classes".to_string(),
                    "test" => "test-classes".to_string(),
                    other => format!("{other}-classes"),
                };
                vec![project_dir.join("target").join(dir)]
            }
        }
    }

    /// Directories holding processed resources for `source_set`.
    /// Maven copies resources into the class directory, so it has none.
    pub fn resource_dirs(self, project_dir: &Path, source_set: &str) -> Vec<PathBuf> {
        match self {
            Layout::Gradle => vec![project_dir.join("build").join("resources").join(source_set)],
            Layout::Maven => Vec::new(),
        }
    }

    /// Source roots for `source_set`, shared by both layouts.
    pub fn source_roots(self, project_dir: &Path, source_set: &str) -> Vec<PathBuf> {
        JVM_LANGUAGES
            .iter()
            .map(|lang| project_dir.join("src").join(source_set).join(lang))
            .collect()
    }
}

/// Whether `dir` looks like a JVM project: a recognised build file plus a
/// `main` source root.
///
/// 判断 `dir` 是否像一个 JVM 项目：存在可识别的构建文件以及 `main` 源码根目录。
pub fn has_jvm_sources(dir: &Path) -> bool {
    Layout::detect(dir).is_some()
        && Layout::Gradle
            .source_roots(dir, "main")
            .iter()
            .any(|root| root.is_dir())
}

/// Output registry backed by a project's build directory.
#[derive(Debug, Clone)]
pub struct FsOutputRegistry {
    project_dir: PathBuf,
    layout: Layout,
    lib_dirs: Vec<PathBuf>,
    extra_classpath: Vec<PathBuf>,
}

impl FsOutputRegistry {
    pub fn new(project_dir: impl Into<PathBuf>, layout: Layout) -> Self {
        Self {
            project_dir: project_dir.into(),
            layout,
            lib_dirs: Vec::new(),
            extra_classpath: Vec::new(),
        }
    }

    /// Directories whose `*.jar` files form the runtime dependency closure.
    pub fn with_lib_dirs(mut self, lib_dirs: Vec<PathBuf>) -> Self {
        self.lib_dirs = lib_dirs;
        self
    }

    /// Entries appended verbatim after the dependency archives.
    pub fn with_extra_classpath(mut self, entries: Vec<PathBuf>) -> Self {
        self.extra_classpath = entries;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl OutputRegistry for FsOutputRegistry {
    fn source_set(&self, name: &str) -> Result<SourceSetOutput> {
        let class_dirs: Vec<PathBuf> = self
            .layout
            .class_dirs(&self.project_dir, name)
            .into_iter()
            .filter(|dir| fs::is_directory(dir))
            .collect();

        if class_dirs.is_empty() {
            bail!(
                "no compiled output for source set '{}' under {} (expected {}); build the project first",
                name,
                self.project_dir.display(),
                self.layout
                    .class_dirs(&self.project_dir, name)
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect::<Vec<_>>()
                    .join(" or ")
            );
        }

        let resource_dirs: Vec<PathBuf> = self
            .layout
            .resource_dirs(&self.project_dir, name)
            .into_iter()
            .filter(|dir| fs::is_directory(dir))
            .collect();

        let mut runtime_classpath: Classpath = class_dirs.iter().cloned().collect();
        runtime_classpath.extend(resource_dirs.iter().cloned());
        for lib_dir in &self.lib_dirs {
            runtime_classpath.extend(fs::jar_files(lib_dir)?);
        }
        runtime_classpath.extend(self.extra_classpath.iter().cloned());

        let module_name = descriptor::find_compiled_module(&class_dirs)?;
        let source_module_name =
            descriptor::find_source_module(&self.layout.source_roots(&self.project_dir, name))?;

        Ok(SourceSetOutput {
            name: name.to_string(),
            runtime_classpath,
            resource_dirs,
            module_name,
            source_module_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::tempdir;

    fn touch_dir(root: &Path, rel: &str) -> PathBuf {
        let dir = root.join(rel);
        stdfs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn detects_layouts() {
        let dir = tempdir().unwrap();
        assert_eq!(Layout::detect(dir.path()), None);

        stdfs::write(dir.path().join("pom.xml"), "<project/>").unwrap();
        assert_eq!(Layout::detect(dir.path()), Some(Layout::Maven));

        stdfs::write(dir.path().join("build.gradle.kts"), "plugins { java }").unwrap();
        assert_eq!(Layout::detect(dir.path()), Some(Layout::Gradle));
    }

    #[test]
    fn jvm_sources_need_a_build_file_and_a_source_root() {
        let dir = tempdir().unwrap();
        touch_dir(dir.path(), "src/main/java");
        assert!(!has_jvm_sources(dir.path()));

        stdfs::write(dir.path().join("build.gradle"), "apply plugin: 'java'").unwrap();
        assert!(has_jvm_sources(dir.path()));
    }

    #[test]
    fn gradle_outputs_are_ordered_classes_resources_libs_extras() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        let classes = touch_dir(root, "build/classes/java/main");
        let resources = touch_dir(root, "build/resources/main");
        let libs = touch_dir(root, "build/deps");
        stdfs::write(libs.join("b.jar"), "").unwrap();
        stdfs::write(libs.join("a.jar"), "").unwrap();
        stdfs::write(libs.join("notes.txt"), "").unwrap();

        let registry = FsOutputRegistry::new(root, Layout::Gradle)
            .with_lib_dirs(vec![libs.clone()])
            .with_extra_classpath(vec![PathBuf::from("/opt/extra.jar")]);
        let output = registry.source_set("main").unwrap();

        assert_eq!(
            output.runtime_classpath.entries(),
            &[
                classes,
                resources.clone(),
                libs.join("a.jar"),
                libs.join("b.jar"),
                PathBuf::from("/opt/extra.jar"),
            ]
        );
        assert_eq!(output.resource_dirs, [resources]);
        assert_eq!(output.module_name, None);
    }

    #[test]
    fn maven_main_outputs_live_in_target_classes() {
        let dir = tempdir().unwrap();
        let classes = touch_dir(dir.path(), "target/classes");
        let src = touch_dir(dir.path(), "src/main/java");
        stdfs::write(src.join("module-info.java"), "module com.campasian { }").unwrap();

        let output = FsOutputRegistry::new(dir.path(), Layout::Maven)
            .source_set("main")
            .unwrap();
        assert_eq!(output.runtime_classpath.entries(), &[classes]);
        assert!(output.resource_dirs.is_empty());
        // Nothing was compiled from module-info.java.
        assert_eq!(output.module_name, None);
        assert_eq!(output.source_module_name.as_deref(), Some("com.campasian"));
    }

    #[test]
    fn missing_outputs_fail_loudly() {
        let dir = tempdir().unwrap();
        let err = FsOutputRegistry::new(dir.path(), Layout::Gradle)
            .source_set("main")
            .unwrap_err();
        assert!(err.to_string().contains("build the project first"));
    }

    #[test]
    fn missing_lib_dir_is_an_error() {
        let dir = tempdir().unwrap();
        touch_dir(dir.path(), "build/classes/kotlin/main");
        let result = FsOutputRegistry::new(dir.path(), Layout::Gradle)
            .with_lib_dirs(vec![dir.path().join("nope")])
            .source_set("main");
        assert!(result.is_err());
    }
}
