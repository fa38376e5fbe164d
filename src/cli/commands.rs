//! Commands reachable from the command line.
//! 命令行可达的命令。

pub mod run;
