//! # Reporting Module / 报告模块
//!
//! This module handles everything the launcher itself prints: task headers,
//! launch plans, task listings and the final outcome. Launcher output goes to
//! stderr so that the launched application's stdout stays untouched.
//!
//! 此模块处理启动器自身打印的所有内容：任务标题、启动计划、任务列表和最终结果。
//! 启动器输出写入 stderr，以保证被启动程序的 stdout 不受干扰。

pub mod console;

// Re-export common reporting functions
pub use console::{print_launch_plan, print_outcome, print_task_header, print_task_list};
