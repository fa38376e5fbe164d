// Shared test helpers for integration tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// Creates a Gradle-style project with sources and, when `compiled`, the
/// class output directory a `gradle classes` run would leave behind,
/// including `module-info.class` when `module_info` names a module.
pub fn setup_gradle_project(module_info: Option<&str>, compiled: bool) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    populate_gradle_project(temp_dir.path(), module_info, compiled);
    temp_dir
}

pub fn populate_gradle_project(dir: &Path, module_info: Option<&str>, compiled: bool) {
    let sources = dir.join("src/main/java/demo");
    fs::create_dir_all(&sources).expect("Failed to create source directory");
    fs::write(dir.join("build.gradle"), "plugins { id 'java' }\n")
        .expect("Failed to write build.gradle");
    fs::write(
        sources.join("App.java"),
        "package demo;\n\npublic class App {\n    public static void main(String[] args) {}\n}\n",
    )
    .expect("Failed to write App.java");

    if let Some(module) = module_info {
        fs::write(
            dir.join("src/main/java/module-info.java"),
            format!("// generated\nmodule {module} {{\n    exports demo;\n}}\n"),
        )
        .expect("Failed to write module-info.java");
    }

    if compiled {
        let classes = dir.join("build/classes/java/main/demo");
        fs::create_dir_all(&classes).expect("Failed to create class directory");
        fs::write(classes.join("App.class"), [0xCA, 0xFE, 0xBA, 0xBE])
            .expect("Failed to write App.class");
        fs::create_dir_all(dir.join("build/resources/main"))
            .expect("Failed to create resource directory");
        if let Some(module) = module_info {
            write_module_descriptor(&dir.join("build/classes/java/main"), module);
        }
    }
}

/// Writes the `module-info.class` javac would produce for `module`.
pub fn write_module_descriptor(class_dir: &Path, module: &str) {
    fs::create_dir_all(class_dir).expect("Failed to create class directory");
    fs::write(class_dir.join("module-info.class"), module_info_class(module))
        .expect("Failed to write module-info.class");
}

fn utf8_constant(out: &mut Vec<u8>, value: &str) {
    out.push(1);
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// A minimal module descriptor: constant pool, `ACC_MODULE` and a `Module` attribute.
pub fn module_info_class(module: &str) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0, 61]);
    out.extend_from_slice(&6u16.to_be_bytes());
    utf8_constant(&mut out, "module-info"); // #1
    out.extend_from_slice(&[7, 0, 1]); // #2 Class
    utf8_constant(&mut out, "Module"); // #3
    utf8_constant(&mut out, module); // #4
    out.extend_from_slice(&[19, 0, 4]); // #5 Module
    out.extend_from_slice(&0x8000u16.to_be_bytes());
    out.extend_from_slice(&[0, 2, 0, 0]);
    out.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&3u16.to_be_bytes());
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&[0, 5, 0, 0, 0, 0]);
    out
}

/// Whether a JDK is on `PATH`, for tests that compile real classes.
pub fn has_jdk() -> bool {
    ["javac", "java"].iter().all(|tool| {
        std::process::Command::new(tool)
            .arg("-version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    })
}

/// Writes `content` as the default init script of `dir` and returns its path.
pub fn write_init_script(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("run.init.toml");
    fs::write(&path, content).expect("Failed to write init script");
    path
}

/// An init script whose `java` is `sh -c <script>`, so the launched command
/// line can be observed without a JDK. Inside the script `$@` holds the
/// arguments the launcher chose.
pub fn stub_java_script(class: &str, module: Option<&str>, script: &str) -> String {
    let module = module
        .map(|module| format!("module = \"{module}\"\n"))
        .unwrap_or_default();
    format!(
        "[java]\nexecutable = \"sh\"\n\n[[targets]]\nclass = \"{class}\"\n{module}jvm_args = [\"-c\", '''{script}''', \"stub\"]\n"
    )
}

/// The launcher binary, started in `dir` with English messages and no colors.
pub fn main_runner(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("main-runner").expect("binary should be built");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("JAVA_HOME")
        .args(["--lang", "en"]);
    cmd
}
