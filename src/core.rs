//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Main Runner,
//! including run targets, the host build model, compiled-output registries
//! and the ordered launch strategies.
//!
//! 此模块包含 Main Runner 的核心功能，
//! 包括运行目标、宿主构建模型、编译输出注册表以及有序的启动策略。

pub mod classpath;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod launch;
pub mod outputs;
pub mod project;
pub mod target;

// Re-exports
pub use classpath::Classpath;
pub use config::InitScript;
pub use error::RunError;
pub use launch::{Invocation, LaunchPlan, LaunchStrategy};
pub use target::RunTarget;
