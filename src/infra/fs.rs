//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides utilities for file system operations,
//! such as expanding configured paths, scanning dependency directories for
//! archives, and locating the `java` executable.
//!
//! 此模块提供文件系统操作的实用功能，
//! 如展开配置中的路径、扫描依赖目录中的归档文件以及定位 `java` 可执行文件。

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Expands `~` and `$VAR` / `${VAR}` in a configured path and anchors
/// relative results at `base`.
///
/// 展开配置路径中的 `~` 和 `$VAR` / `${VAR}`，并将相对路径锚定到 `base`。
pub fn expand_path(raw: &str, base: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand path: {raw}"))?;
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(base.join(path))
    }
}

/// Lists the `*.jar` files directly inside `dir`, sorted by file name so the
/// resulting classpath order is stable across runs.
pub fn jar_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut jars: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read library directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        })
        .collect();
    jars.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(jars)
}

fn java_binary_name() -> &'static str {
    if cfg!(windows) { "java.exe" } else { "java" }
}

/// Picks the `java` executable: the configured one, else `$JAVA_HOME/bin/java`
/// when it exists, else plain `java` looked up on `PATH` at spawn time.
///
/// 选择 `java` 可执行文件：优先使用配置值，其次是存在的 `$JAVA_HOME/bin/java`，
/// 否则在启动时从 `PATH` 中查找 `java`。
pub fn resolve_java_executable(configured: Option<&str>, base: &Path) -> Result<PathBuf> {
    if let Some(raw) = configured {
        // Bare command names stay as-is so that PATH lookup still applies.
        if !raw.contains(['/', '\\']) && !raw.starts_with('~') && !raw.contains('$') {
            return Ok(PathBuf::from(raw));
        }
        return expand_path(raw, base);
    }

    if let Some(java_home) = env::var_os("JAVA_HOME").filter(|home| !home.is_empty()) {
        let candidate = PathBuf::from(java_home).join("bin").join(java_binary_name());
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Ok(PathBuf::from(java_binary_name()))
}
