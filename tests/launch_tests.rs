//! End-to-end launches with `sh` standing in for `java`.
#![cfg(unix)]

mod common;

use common::{main_runner, setup_gradle_project, stub_java_script, write_init_script};
use predicates::prelude::*;

#[test]
fn test_modular_launch_passes_module_arguments() {
    let project = setup_gradle_project(Some("demo"), true);
    write_init_script(
        project.path(),
        &stub_java_script("demo.App", None, r#"echo "launched: $*""#),
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .assert()
        .success()
        .stdout(predicate::str::contains("launched: --module-path"))
        .stdout(predicate::str::contains("/build/resources/main --module demo/demo.App"))
        .stdout(predicate::str::contains("--patch-module demo="))
        .stdout(predicate::str::ends_with("--module demo/demo.App\n"))
        .stderr(predicate::str::contains("RUN SUCCESSFUL"));
}

#[test]
fn test_classpath_launch_when_no_module_is_declared() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script("demo.App", None, r#"echo "launched: $*""#),
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .assert()
        .success()
        .stdout(predicate::str::contains("launched: -cp"))
        .stdout(predicate::str::contains("build/classes/java/main"))
        .stdout(predicate::str::ends_with(" demo.App\n"));
}

/// Program arguments from `--args` follow the target's own arguments.
///
/// 来自 `--args` 的程序参数位于目标自身参数之后。
#[test]
fn test_extra_arguments_are_appended() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script("demo.App", None, r#"echo "launched: $*""#),
    );

    main_runner(project.path())
        .args(["--args", "--port 8080 'two words'", "demo.App.main()"])
        .assert()
        .success()
        .stdout(predicate::str::ends_with("demo.App --port 8080 two words\n"));
}

/// A non-zero exit from the application is its own result, not a launcher error.
///
/// 应用程序的非零退出是其自身的结果，而不是启动器错误。
#[test]
fn test_application_exit_code_is_propagated() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script("demo.App", None, r#"echo "application failed" >&2; exit 3"#),
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("application failed"))
        .stderr(predicate::str::contains("non-zero exit value 3"))
        .stderr(predicate::str::contains("FAILURE:").not());
}

#[test]
fn test_runtime_launch_diagnostic_becomes_a_launch_error() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script(
            "demo.App",
            None,
            r#"echo "Error: Could not find or load main class demo.App" >&2
echo "Caused by: java.lang.ClassNotFoundException: demo.App" >&2
exit 1"#,
        ),
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("FAILURE: Run failed with an exception."))
        .stderr(predicate::str::contains(
            "The runtime could not start task 'demo.App.main()':",
        ))
        .stderr(predicate::str::contains(
            "Caused by: java.lang.ClassNotFoundException: demo.App",
        ));
}

#[test]
fn test_missing_java_executable_is_a_launch_error() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        "[java]\nexecutable = \"/nonexistent/bin/java\"\n\n[[targets]]\nclass = \"demo.App\"\n",
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .assert()
        .code(125)
        .stderr(predicate::str::contains("Failed to start '/nonexistent/bin/java'"));
}

/// The first failing task stops the run.
///
/// 第一个失败的任务会中止运行。
#[test]
fn test_tasks_run_in_order_until_one_fails() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script(
            "demo.App",
            None,
            r#"echo "ran $1""#,
        )
        .replace(
            "[[targets]]",
            "[[targets]]\nclass = \"demo.Tool\"\njvm_args = [\"-c\", 'exit 4', \"stub\"]\n\n[[targets]]",
        ),
    );

    main_runner(project.path())
        .args(["demo.App.main()", "demo.Tool.main()", "demo.App.main()"])
        .assert()
        .code(4)
        .stdout(predicate::str::contains("ran -cp").count(1));
}

#[test]
fn test_stdin_is_inherited() {
    let project = setup_gradle_project(None, true);
    write_init_script(
        project.path(),
        &stub_java_script("demo.App", None, r#"read line; echo "got $line""#),
    );

    main_runner(project.path())
        .arg("demo.App.main()")
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("got hello"));
}
