//! # Process Supervision Module / 进程监管模块
//!
//! Spawns the launched application and waits for it. stdin and stdout are
//! inherited. stderr is piped only so it can be forwarded line by line,
//! byte for byte, while the launcher watches for the JVM's own launch
//! diagnostics.
//!
//! 启动应用程序并等待其结束。stdin 和 stdout 直接继承。
//! stderr 通过管道逐行、逐字节原样转发，同时启动器监视 JVM 自身的启动诊断信息。

use colored::*;
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Child;
use tokio::signal;

use crate::core::error::RunError;
use crate::core::launch::Invocation;
use crate::infra::t;

/// Line prefixes the JVM launcher prints on stderr when it cannot start the
/// entry point. Boot layer failures (`FindException` and friends) are printed
/// by the VM on stdout and are never seen here.
const LAUNCHER_DIAGNOSTICS: [&str; 5] = [
    "Error: Could not find or load main class",
    "Error: Main method not found in class",
    "Error: Main method is not static",
    "Error: Unable to initialize main class",
    "Error: JavaFX runtime components are missing",
];

/// Continuation lines kept after a diagnostic line.
const DIAGNOSTIC_CONTEXT: usize = 3;

/// Maps an exit status to a shell-style exit code: the process's own code,
/// or `128 + signal` when it was killed by a signal.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Picks the JVM launch diagnostic out of captured stderr lines, if any,
/// keeping the lines exactly as the runtime printed them.
///
/// 从捕获的 stderr 行中挑出 JVM 启动诊断信息（如有），保持运行时打印的原样。
pub fn launcher_diagnostic(lines: &[String]) -> Option<String> {
    let start = lines
        .iter()
        .position(|line| LAUNCHER_DIAGNOSTICS.iter().any(|prefix| line.starts_with(prefix)))?;

    let context = lines[start + 1..]
        .iter()
        .take_while(|line| {
            line.starts_with("Caused by:")
                || line.starts_with("java.lang.")
                || line.starts_with(char::is_whitespace)
        })
        .take(DIAGNOSTIC_CONTEXT);

    let mut diagnostic = vec![lines[start].as_str()];
    diagnostic.extend(context.map(String::as_str));
    Some(diagnostic.join("\n"))
}

/// Copies `stream` to `sink` unchanged and returns the lines that may belong
/// to a launch diagnostic. Lines are scanned even when `sink` fails.
async fn forward_stderr<R, W>(stream: R, mut stderr: W) -> Vec<String>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    let mut captured = Vec::new();
    let mut remaining_context = 0usize;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        let line = String::from_utf8_lossy(&buf)
            .trim_end_matches(['\r', '\n'])
            .to_string();
        if LAUNCHER_DIAGNOSTICS.iter().any(|prefix| line.starts_with(prefix)) {
            remaining_context = DIAGNOSTIC_CONTEXT;
            captured.push(line);
        } else if remaining_context > 0 {
            remaining_context -= 1;
            captured.push(line);
        }

        // A closed stderr of our own must not stop the draining.
        if stderr.write_all(&buf).await.is_ok() {
            let _ = stderr.flush().await;
        }
    }

    captured
}

/// Waits for the child. The first Ctrl-C is left to the child, which shares
/// the terminal's process group; a second one kills it.
async fn wait_for_child(child: &mut Child) -> std::io::Result<ExitStatus> {
    let mut interrupts = 0u32;
    loop {
        tokio::select! {
            status = child.wait() => return status,
            received = signal::ctrl_c() => {
                if received.is_err() {
                    return child.wait().await;
                }
                interrupts += 1;
                if interrupts == 1 {
                    eprintln!("\n{}", t!("run.interrupted").yellow());
                } else {
                    eprintln!("{}", t!("run.killing").red());
                    child.start_kill()?;
                }
            }
        }
    }
}

/// Spawns `invocation`, forwards its stderr, waits for it and maps the outcome.
///
/// A non-zero exit accompanied by a JVM launch diagnostic becomes a
/// [`RunError::Launch`]; any other exit code is the application's own result.
pub async fn run(invocation: &Invocation, label: &str) -> Result<i32, RunError> {
    let mut cmd = invocation.command();
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| {
        RunError::launch(
            label,
            format!("Failed to start '{}': {}", invocation.program.display(), e),
            None,
        )
    })?;

    let forwarder = child
        .stderr
        .take()
        .map(|stderr| tokio::spawn(forward_stderr(stderr, tokio::io::stderr())));

    let status = wait_for_child(&mut child).await.map_err(|e| {
        RunError::launch(label, format!("Failed to wait for the application: {e}"), None)
    })?;

    let captured = match forwarder {
        Some(handle) => handle.await.unwrap_or_default(),
        None => Vec::new(),
    };

    let code = exit_code(status);
    if code != 0 {
        if let Some(diagnostic) = launcher_diagnostic(&captured) {
            return Err(RunError::launch(label, diagnostic, Some(code)));
        }
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn finds_missing_main_class() {
        let captured = lines(
            "Picked up JAVA_TOOL_OPTIONS: -Dfoo=bar\n\
             Error: Could not find or load main class demo.App\n\
             Caused by: java.lang.ClassNotFoundException: demo.App",
        );
        assert_eq!(
            launcher_diagnostic(&captured).unwrap(),
            "Error: Could not find or load main class demo.App\n\
             Caused by: java.lang.ClassNotFoundException: demo.App"
        );
    }

    #[test]
    fn finds_missing_main_method() {
        let captured = lines(
            "Error: Main method not found in class demo.App, please define the main method as:\n   \
             public static void main(String[] args)",
        );
        let diagnostic = launcher_diagnostic(&captured).unwrap();
        assert!(diagnostic.starts_with("Error: Main method not found in class demo.App"));
        assert!(diagnostic.ends_with("public static void main(String[] args)"));
    }

    #[test]
    fn boot_layer_errors_are_not_stderr_diagnostics() {
        let captured = lines(
            "Error occurred during initialization of boot layer\n\
             java.lang.module.FindException: Module demo not found",
        );
        assert_eq!(launcher_diagnostic(&captured), None);
    }

    /// A writer that always fails, like a closed stderr.
    struct ClosedSink;

    impl AsyncWrite for ClosedSink {
        fn poll_write(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
            _: &[u8],
        ) -> std::task::Poll<std::io::Result<usize>> {
            std::task::Poll::Ready(Err(std::io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }

        fn poll_shutdown(
            self: std::pin::Pin<&mut Self>,
            _: &mut std::task::Context<'_>,
        ) -> std::task::Poll<std::io::Result<()>> {
            std::task::Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn forwarding_copies_bytes_and_captures_diagnostics() {
        let input: &[u8] = b"starting\r\nError: Could not find or load main class demo.App\n\
            Caused by: java.lang.ClassNotFoundException: demo.App\nno newline";
        let mut sink = Vec::new();
        let captured = forward_stderr(input, &mut sink).await;

        assert_eq!(sink, input);
        assert_eq!(
            captured,
            [
                "Error: Could not find or load main class demo.App",
                "Caused by: java.lang.ClassNotFoundException: demo.App",
                "no newline",
            ]
        );
    }

    #[tokio::test]
    async fn diagnostics_survive_a_closed_stderr() {
        let input: &[u8] = b"Error: Could not find or load main class demo.App\n";
        let captured = forward_stderr(input, ClosedSink).await;
        assert_eq!(launcher_diagnostic(&captured).unwrap(), "Error: Could not find or load main class demo.App");
    }

    #[test]
    fn application_errors_are_not_launch_diagnostics() {
        let captured = lines(
            "Exception in thread \"main\" java.lang.IllegalStateException: boom\n\
             \tat demo.App.main(App.java:3)",
        );
        assert_eq!(launcher_diagnostic(&captured), None);
    }

    #[cfg(unix)]
    #[test]
    fn exit_code_maps_signals() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // SIGKILL
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }
}
