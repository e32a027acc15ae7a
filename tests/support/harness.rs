use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures;

/// TestHarness provides an isolated assistant project in a temporary directory.
///
/// The binary always runs with the project as its working directory, so the
/// default `domain.yml`, `config.yml` and `data` paths resolve inside it.
pub struct TestHarness {
    pub dir: TempDir,
    pub binary: PathBuf,
}

impl TestHarness {
    /// An empty project directory.
    pub fn new() -> Self {
        TestHarness {
            dir: TempDir::new().expect("Failed to create temp dir"),
            binary: PathBuf::from(env!("CARGO_BIN_EXE_assistant")),
        }
    }

    /// The mood bot project: domain, config with a unique assistant id,
    /// NLU data, stories and rules.
    pub fn simple_project() -> Self {
        let harness = Self::new();
        harness.write("domain.yml", fixtures::MOODBOT_DOMAIN);
        harness.write("config.yml", fixtures::CONFIG_UNIQUE_ASSISTANT_ID);
        harness.write("data/nlu.yml", fixtures::MOODBOT_NLU);
        harness.write("data/stories.yml", fixtures::MOODBOT_STORIES);
        harness.write("data/rules.yml", fixtures::MOODBOT_RULES);
        harness
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative))
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", relative, e))
    }

    pub fn read_yaml(&self, relative: &str) -> serde_yaml::Value {
        serde_yaml::from_str(&self.read(relative))
            .unwrap_or_else(|e| panic!("Invalid YAML in {}: {}", relative, e))
    }

    pub fn exists(&self, relative: &str) -> bool {
        self.path().join(relative).exists()
    }

    /// Executes the binary with the given arguments in the project directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary)
            .args(args)
            .current_dir(self.path())
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run assistant binary")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
