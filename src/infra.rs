//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for Main Runner,
//! including child process supervision, file system helpers, and i18n support.
//!
//! 此模块为 Main Runner 提供基础设施服务，
//! 包括子进程监管、文件系统辅助函数和国际化支持。

pub mod fs;
pub mod process;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
