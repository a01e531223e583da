//! Build settings (testbuild.toml format).
//!
//! Only the tool programs and the output mode can be changed. The generator,
//! build type, C++ standard, job count and test binary are constants
//! ([`GENERATOR`](crate::GENERATOR) and friends); naming any of them in the
//! file is a parse error.

use serde::Deserialize;
use std::path::Path;

/// Name of the optional settings file looked up in the project root.
pub const SETTINGS_FILE: &str = "testbuild.toml";

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsFile {
    /// Toolchain settings.
    #[serde(default)]
    pub build: BuildSettings,
}

/// Tool programs and output handling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildSettings {
    /// Build-file generator program.
    pub cmake: String,

    /// Build-execution program.
    pub make: String,

    /// Whether child output goes to the console or into the step outcome.
    pub output: OutputMode,
}

/// How child process output is handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Children write straight to the console.
    #[default]
    Inherit,
    /// stdout/stderr are collected into each step outcome.
    Capture,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            cmake: "cmake".to_string(),
            make: "make".to_string(),
            output: OutputMode::Inherit,
        }
    }
}

impl BuildSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let file: SettingsFile = toml::from_str(content)?;
        Ok(file.build)
    }

    /// Load `testbuild.toml` from `project_root`, falling back to the
    /// defaults when the file does not exist.
    pub fn discover(project_root: &Path) -> crate::Result<Self> {
        let path = project_root.join(SETTINGS_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        tracing::debug!("Loading settings from {}", path.display());
        Self::from_file(&path)
    }

    /// Set the output mode.
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{build_command, configure_command, test_command};
    use crate::options::InvocationOptions;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = BuildSettings::default();

        assert_eq!(settings.cmake, "cmake");
        assert_eq!(settings.make, "make");
        assert_eq!(settings.output, OutputMode::Inherit);
    }

    #[test]
    fn test_parse_partial_settings() {
        let toml = r#"
[build]
make = "gmake"
output = "capture"
        "#;

        let settings = BuildSettings::from_toml(toml).unwrap();

        assert_eq!(settings.make, "gmake");
        assert_eq!(settings.output, OutputMode::Capture);
        assert_eq!(settings.cmake, "cmake");
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = BuildSettings::from_toml("").unwrap();
        assert_eq!(settings, BuildSettings::default());
    }

    #[test]
    fn test_parse_error() {
        let result = BuildSettings::from_toml("[build]\noutput = \"quiet\"\n");
        assert!(matches!(
            result,
            Err(crate::OrchestrateError::ParseSettings(_))
        ));
    }

    #[test]
    fn test_fixed_values_cannot_be_overridden() {
        for line in [
            "generator = \"Ninja\"",
            "build_type = \"Release\"",
            "cxx_standard = 20",
            "jobs = 0",
            "test_binary = \"./other\"",
        ] {
            let result = BuildSettings::from_toml(&format!("[build]\n{line}\n"));
            assert!(
                matches!(result, Err(crate::OrchestrateError::ParseSettings(_))),
                "{line} was accepted"
            );
        }
    }

    #[test]
    fn test_settings_keep_fixed_tokens() {
        let settings =
            BuildSettings::from_toml("[build]\ncmake = \"/opt/cmake/bin/cmake\"\n").unwrap();

        let configure =
            configure_command(&InvocationOptions::new(), &settings, Path::new("/src")).command_line();
        assert_eq!(
            configure,
            "/opt/cmake/bin/cmake -G \"Unix Makefiles\" -DCMAKE_BUILD_TYPE=Debug \
             -DCMAKE_EXPORT_COMPILE_COMMANDS=1 -DCMAKE_CXX_STANDARD=17 /src"
        );
        assert_eq!(build_command(&settings).command_line(), "make -j 10");
        assert_eq!(test_command().command_line(), "./tests");
    }

    #[test]
    fn test_unknown_table_rejected() {
        let result = BuildSettings::from_toml("[toolchain]\ncc = \"clang\"\n");
        assert!(matches!(
            result,
            Err(crate::OrchestrateError::ParseSettings(_))
        ));
    }

    #[test]
    fn test_discover_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let settings = BuildSettings::discover(temp_dir.path()).unwrap();
        assert_eq!(settings, BuildSettings::default());
    }

    #[test]
    fn test_discover_reads_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            temp_dir.path().join(SETTINGS_FILE),
            "[build]\nmake = \"gmake\"\n",
        )
        .unwrap();

        let settings = BuildSettings::discover(temp_dir.path()).unwrap();
        assert_eq!(settings.make, "gmake");
        assert_eq!(build_command(&settings).command_line(), "gmake -j 10");
    }
}
