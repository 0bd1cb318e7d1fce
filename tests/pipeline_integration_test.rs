use anyhow::Result;
use osta::config::toml_config::ProjectConfig;
use osta::domain::model::EmitKind;
use osta::utils::validation::Validate;
use osta::{BuildSettings, CompilePipeline, CompilerEngine, LocalStorage, OstaError};
use std::path::Path;
use tempfile::TempDir;

const PROGRAM: &str = "\
width = 12;
height = width * 2 + 1;
area = width * height;
area %= 100;
";

fn write_source(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_end_to_end_compile_writes_artifacts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_source(temp_dir.path(), "src/shapes.osta", PROGRAM);

    let settings = BuildSettings::new(temp_dir.path(), vec!["src/shapes.osta".to_string()])
        .with_output_path("build")
        .with_emit(EmitKind::ALL.to_vec())
        .with_monitor(true);
    settings.validate()?;
    let monitor_enabled = settings.monitor;

    let storage = LocalStorage::new(temp_dir.path());
    let pipeline = CompilePipeline::new(storage, settings);
    let engine = CompilerEngine::new_with_monitoring(pipeline, monitor_enabled);

    let output = engine.run().await?;
    assert_eq!(output, "build");
    assert!(engine.monitor().is_enabled());

    let build_dir = temp_dir.path().join("build");
    let il = std::fs::read_to_string(build_dir.join("shapes.il"))?;
    assert!(il.starts_with("push.i64 12\nstore width\n"));
    assert!(il.ends_with("load area\npush.i64 100\nrem\nstore area\n"));

    let tokens: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(build_dir.join("shapes.tokens.json"))?)?;
    let tokens = tokens.as_array().unwrap();
    assert_eq!(tokens[0]["kind"], "IDENTIFIER");
    assert_eq!(tokens[0]["value"], "width");
    assert_eq!(tokens.last().unwrap()["kind"], "EOF");

    let ast: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(build_dir.join("shapes.ast.json"))?)?;
    assert_eq!(ast["statements"].as_array().unwrap().len(), 4);

    let dot = std::fs::read_to_string(build_dir.join("shapes.cst.dot"))?;
    assert!(dot.starts_with("digraph CST {"));
    assert!(dot.contains("ROOT"));

    Ok(())
}

#[tokio::test]
async fn test_end_to_end_from_manifest() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_source(temp_dir.path(), "main.osta", "x = 1;");
    write_source(
        temp_dir.path(),
        "osta.toml",
        r#"
[project]
name = "manifest-demo"
version = "0.1.0"

[build]
sources = ["main.osta"]
output_path = "out"
emit = ["il"]

[monitoring]
enabled = true
"#,
    );

    let manifest = ProjectConfig::from_file(temp_dir.path().join("osta.toml"))?;
    manifest.validate()?;
    let settings = BuildSettings::from_manifest(&manifest, temp_dir.path())?;
    let monitor_enabled = settings.monitor;

    let pipeline = CompilePipeline::new(LocalStorage::new(temp_dir.path()), settings);
    let engine = CompilerEngine::new_with_monitoring(pipeline, monitor_enabled);
    engine.run().await?;

    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("out/main.il"))?,
        "push.i64 1\nstore x\n"
    );
    assert_eq!(engine.monitor().phases().len(), 3);
    assert!(!temp_dir.path().join("out/main.ast.json").exists());

    Ok(())
}

#[tokio::test]
async fn test_syntax_error_is_attributed_to_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_source(temp_dir.path(), "broken.osta", "a = 1;\nb = (2 + ;");

    let settings = BuildSettings::new(temp_dir.path(), vec!["broken.osta".to_string()]);
    let pipeline = CompilePipeline::new(LocalStorage::new(temp_dir.path()), settings);
    let engine = CompilerEngine::new(pipeline);

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, OstaError::SourceError { ref path, .. } if path == "broken.osta"));
    assert_eq!(err.severity().exit_code(), 1);
    assert!(err.user_friendly_message().starts_with("broken.osta: "));
    assert!(!temp_dir.path().join("build").exists());

    Ok(())
}

#[tokio::test]
async fn test_unknown_character_is_a_lex_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_source(temp_dir.path(), "odd.osta", "a = 1 @ 2;");

    let settings = BuildSettings::new(temp_dir.path(), vec!["odd.osta".to_string()]);
    let pipeline = CompilePipeline::new(LocalStorage::new(temp_dir.path()), settings);

    let err = CompilerEngine::new(pipeline).run().await.unwrap_err();
    match err {
        OstaError::SourceError { source, .. } => {
            assert!(matches!(*source, OstaError::LexError(_)));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    Ok(())
}

#[test]
fn test_missing_source_fails_with_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let settings = BuildSettings::new(temp_dir.path(), vec!["nowhere.osta".to_string()]);
    let pipeline = CompilePipeline::new(LocalStorage::new(temp_dir.path()), settings);
    let engine = CompilerEngine::new(pipeline);

    let err = tokio_test::block_on(engine.run()).unwrap_err();
    assert_eq!(err.severity().exit_code(), 2);
}
