pub mod cli;
pub mod toml_config;

use crate::domain::model::EmitKind;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{OstaError, Result};
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::path::Path;
use std::path::PathBuf;
use toml_config::{ProjectConfig, DEFAULT_OUTPUT_PATH};

/// Manifest looked up in the working directory when no sources are given.
pub const MANIFEST_FILE: &str = "osta.toml";

/// Fully resolved settings for one compiler run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSettings {
    /// Directory relative source and output paths are resolved against.
    pub root: PathBuf,
    pub sources: Vec<String>,
    pub output_path: String,
    pub emit: Vec<EmitKind>,
    pub monitor: bool,
}

impl BuildSettings {
    pub fn new(root: impl Into<PathBuf>, sources: Vec<String>) -> Self {
        Self {
            root: root.into(),
            sources,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            emit: vec![EmitKind::Il],
            monitor: false,
        }
    }

    /// Settings described by a manifest located in `root`.
    pub fn from_manifest(manifest: &ProjectConfig, root: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            sources: manifest.build.sources.clone(),
            output_path: manifest.output_path().to_string(),
            emit: manifest.emit_kinds()?,
            monitor: manifest.monitoring_enabled(),
        })
    }

    #[must_use]
    pub fn with_output_path(mut self, output_path: impl Into<String>) -> Self {
        self.output_path = output_path.into();
        self
    }

    #[must_use]
    pub fn with_emit(mut self, emit: Vec<EmitKind>) -> Self {
        self.emit = emit;
        self
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: bool) -> Self {
        self.monitor = monitor;
        self
    }

    /// What a run with these settings would read and write, one item per line.
    pub fn summary(&self) -> String {
        let mut lines = vec![format!("📁 Root: {}", self.root.display())];
        lines.extend(self.sources.iter().map(|source| format!("📄 Source: {}", source)));
        lines.push(format!("📁 Output: {}", self.output_path));
        let emit: Vec<&str> = self.emit.iter().map(|kind| kind.name()).collect();
        lines.push(format!("🧾 Emit: {}", emit.join(", ")));
        lines.join("\n")
    }
}

impl ConfigProvider for BuildSettings {
    fn sources(&self) -> &[String] {
        &self.sources
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn emit_kinds(&self) -> &[EmitKind] {
        &self.emit
    }
}

impl Validate for BuildSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_sources("sources", &self.sources)?;
        validation::validate_path("output_path", &self.output_path)?;
        if self.emit.is_empty() {
            return Err(OstaError::MissingConfigError {
                field: "emit".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "osta")]
#[command(about = "Front-end for the osta language: lexes, parses and lowers sources to IL")]
pub struct CliConfig {
    /// Source files to compile; overrides the manifest's `build.sources`
    pub sources: Vec<String>,

    #[arg(long, short = 'c', help = "Path to an osta.toml manifest")]
    pub config: Option<String>,

    #[arg(long, short = 'o', help = "Directory the artifacts are written to")]
    pub output: Option<String>,

    #[arg(long, value_delimiter = ',', help = "Artifacts to emit: tokens,cst,ast,il")]
    pub emit: Vec<String>,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-phase timing and memory usage")]
    pub monitor: bool,

    #[arg(long, help = "Resolve and validate the configuration without compiling")]
    pub dry_run: bool,

    #[arg(long, help = "Emit logs as JSON lines on stderr")]
    pub log_json: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    fn manifest_path(&self, cwd: &Path) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(PathBuf::from(path)),
            None if self.sources.is_empty() => {
                let default = cwd.join(MANIFEST_FILE);
                default.exists().then_some(default)
            }
            None => None,
        }
    }

    /// Merges the command line over the manifest (when there is one).
    /// Paths given on the command line stay relative to the working directory.
    pub fn resolve(&self) -> Result<BuildSettings> {
        self.resolve_from(&std::env::current_dir()?)
    }

    /// [`resolve`](Self::resolve) with `cwd` as the working directory.
    pub fn resolve_from(&self, cwd: &Path) -> Result<BuildSettings> {
        let mut settings = match self.manifest_path(cwd) {
            Some(path) => {
                tracing::debug!("Loading manifest {}", path.display());
                let manifest = ProjectConfig::from_file(cwd.join(&path))?;
                manifest.validate()?;
                let root = manifest_root(cwd, &path);
                BuildSettings::from_manifest(&manifest, root)?
            }
            None => BuildSettings::new(cwd, Vec::new()),
        };

        if !self.sources.is_empty() {
            settings.sources = self
                .sources
                .iter()
                .map(|source| relative_to(cwd, source))
                .collect();
        }
        if let Some(output) = &self.output {
            settings.output_path = relative_to(cwd, output);
        }
        if !self.emit.is_empty() {
            settings.emit = validation::parse_emit_kinds("--emit", &self.emit)?;
        }
        if self.monitor {
            settings.monitor = true;
        }

        Ok(settings)
    }
}

#[cfg(feature = "cli")]
fn manifest_root(cwd: &Path, manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => cwd.join(parent),
        _ => cwd.to_path_buf(),
    }
}

#[cfg(feature = "cli")]
/// Anchors a working-directory path so it survives being joined onto another root.
fn relative_to(cwd: &Path, path: &str) -> String {
    let path = Path::new(path);
    if path.is_absolute() {
        path.display().to_string()
    } else {
        cwd.join(path).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_manifest() {
        let manifest = ProjectConfig::from_toml_str(
            r#"
[project]
name = "demo"
version = "0.1.0"

[build]
sources = ["src/main.osta"]
emit = ["tokens", "il"]
"#,
        )
        .unwrap();

        let settings = BuildSettings::from_manifest(&manifest, "/work/demo").unwrap();
        assert_eq!(settings.root, PathBuf::from("/work/demo"));
        assert_eq!(settings.sources(), ["src/main.osta".to_string()]);
        assert_eq!(settings.output_path(), DEFAULT_OUTPUT_PATH);
        assert_eq!(settings.emit_kinds(), [EmitKind::Tokens, EmitKind::Il]);
        assert!(!settings.monitor);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation() {
        let settings = BuildSettings::new(".", Vec::new());
        assert!(matches!(
            settings.validate(),
            Err(OstaError::MissingConfigError { .. })
        ));

        let settings = BuildSettings::new(".", vec!["main.osta".to_string()]).with_emit(Vec::new());
        assert!(settings.validate().is_err());

        let settings = BuildSettings::new(".", vec!["main.osta".to_string()]).with_output_path("");
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_relative_to_keeps_absolute_paths() {
        let cwd = Path::new("/home/dev");
        assert_eq!(relative_to(cwd, "/tmp/a.osta"), "/tmp/a.osta");
        assert_eq!(relative_to(cwd, "a.osta"), "/home/dev/a.osta");
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_overrides_without_manifest() {
        let cli = CliConfig::parse_from([
            "osta",
            "main.osta",
            "--emit",
            "ast,cst",
            "--output",
            "/tmp/osta-build",
            "--monitor",
        ]);

        let settings = cli.resolve().unwrap();
        assert_eq!(settings.sources.len(), 1);
        assert!(settings.sources[0].ends_with("main.osta"));
        assert_eq!(settings.output_path, "/tmp/osta-build");
        assert_eq!(settings.emit, vec![EmitKind::Ast, EmitKind::Cst]);
        assert!(settings.monitor);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_falls_back_to_manifest_in_working_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join(MANIFEST_FILE),
            r#"
[project]
name = "fallback"
version = "0.1.0"

[build]
sources = ["src/main.osta"]
output_path = "out"
"#,
        )
        .unwrap();

        let settings = CliConfig::parse_from(["osta"]).resolve_from(temp_dir.path()).unwrap();
        assert_eq!(settings.root, temp_dir.path());
        assert_eq!(settings.sources, vec!["src/main.osta".to_string()]);
        assert_eq!(settings.output_path, "out");

        // Sources on the command line win and the manifest is not read.
        let settings = CliConfig::parse_from(["osta", "a.osta"])
            .resolve_from(temp_dir.path())
            .unwrap();
        assert_eq!(settings.output_path, DEFAULT_OUTPUT_PATH);
        assert_eq!(settings.sources, vec![temp_dir.path().join("a.osta").display().to_string()]);

        let empty = tempfile::TempDir::new().unwrap();
        let settings = CliConfig::parse_from(["osta"]).resolve_from(empty.path()).unwrap();
        assert!(settings.sources.is_empty());
        assert!(settings.validate().is_err());
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_dry_run_summary() {
        let cli = CliConfig::parse_from(["osta", "--dry-run", "a.osta", "--emit", "tokens,il"]);
        assert!(cli.dry_run);

        let settings = cli.resolve_from(Path::new("/work")).unwrap();
        let summary = settings.summary();
        assert_eq!(
            summary.lines().collect::<Vec<_>>(),
            vec![
                "📁 Root: /work",
                "📄 Source: /work/a.osta",
                "📁 Output: ./build",
                "🧾 Emit: tokens, il",
            ]
        );
        assert!(!CliConfig::parse_from(["osta", "a.osta"]).dry_run);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_cli_rejects_unknown_emit_kind() {
        let cli = CliConfig::parse_from(["osta", "main.osta", "--emit", "jar"]);
        assert!(cli.resolve().is_err());
    }
}
