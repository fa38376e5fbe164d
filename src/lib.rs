//! # Main Runner Library / Main Runner 库
//!
//! This library provides the core functionality for the Main Runner tool,
//! a launcher that runs a JVM `main()` class straight from an existing build
//! layout, the way an IDE "run configuration" does.
//!
//! 此库为 Main Runner 工具提供核心功能，
//! 这是一个直接从现有构建输出启动 JVM `main()` 类的启动器，行为类似 IDE 的"运行配置"。
//!
//! ## Modules / 模块
//!
//! - `core` - Run targets, the host build model, output registries and launch strategies
//! - `infra` - Infrastructure services like process supervision and file system helpers
//! - `reporting` - Console output for task headers, listings and outcomes
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 运行目标、宿主构建模型、输出注册表和启动策略
//! - `infra` - 基础设施服务，如进程监管和文件系统辅助函数
//! - `reporting` - 任务标题、任务列表和结果的控制台输出
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::error::{LAUNCHER_FAILURE, RunError};
pub use core::project::{Build, Project, TaskHandle};
pub use core::target::{RunTarget, TaskSelector};

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    rust_i18n::set_locale(match_locale(&locale));
}

/// Maps a requested locale onto one of the bundled locales.
/// 将请求的语言区域映射到内置的语言区域之一。
pub fn match_locale(locale: &str) -> &str {
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split(['-', '_'])
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    }
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
