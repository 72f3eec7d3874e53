#![cfg(unix)]

mod common;

use std::fs;

use tempfile::tempdir;

use drawport::{
    DrawportError,
    config::{ConvertConfig, ToolsConfig},
    pipeline::{EXIT_OK, EXIT_PARTIAL_FAILURE, Pipeline},
    tool::Tool,
};

use common::{converter, fake_tools, fixture};

fn diagrams_dir(names: &[&str]) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    for name in names {
        fs::copy(fixture("architecture.drawio"), dir.path().join(name)).unwrap();
    }
    dir
}

#[tokio::test]
async fn converts_every_diagram() {
    let bin = tempdir().unwrap();
    let diagrams = diagrams_dir(&["a.drawio", "b.drawio"]);
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), fake_tools(bin.path())));

    let report = pipeline.run(diagrams.path(), false).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.converted, 2);
    assert!(report.failures.is_empty());
    assert_eq!(report.exit_code(), EXIT_OK);
    for stem in ["a", "b"] {
        assert!(diagrams.path().join(format!("{stem}.svg")).is_file());
        assert!(diagrams.path().join(format!("{stem}.emf")).is_file());
    }
}

#[tokio::test]
async fn failure_does_not_stop_the_batch() {
    let bin = tempdir().unwrap();
    let diagrams = diagrams_dir(&["a.drawio", "broken.drawio", "c.drawio"]);
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), fake_tools(bin.path())));

    let report = pipeline.run(diagrams.path(), false).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.converted, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, diagrams.path().join("broken.drawio"));
    assert_eq!(report.exit_code(), EXIT_PARTIAL_FAILURE);
    assert!(diagrams.path().join("c.emf").is_file());
    assert!(!diagrams.path().join("broken.emf").exists());
}

#[tokio::test]
async fn dry_run_writes_nothing() {
    let bin = tempdir().unwrap();
    let diagrams = diagrams_dir(&["a.drawio"]);
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), fake_tools(bin.path())));

    let report = pipeline.run(diagrams.path(), true).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.total, 1);
    assert_eq!(report.exit_code(), EXIT_OK);
    assert!(!diagrams.path().join("a.svg").exists());
    assert!(!diagrams.path().join("a.emf").exists());
}

#[tokio::test]
async fn empty_directory_is_not_an_error() {
    let bin = tempdir().unwrap();
    let diagrams = tempdir().unwrap();
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), fake_tools(bin.path())));

    let report = pipeline.run(diagrams.path(), false).await.unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.exit_code(), EXIT_OK);
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let bin = tempdir().unwrap();
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), fake_tools(bin.path())));

    let err = pipeline
        .run(&bin.path().join("no-such-dir"), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DrawportError::Io(_)));
}

#[tokio::test]
async fn missing_tool_aborts_before_converting() {
    let diagrams = diagrams_dir(&["a.drawio"]);
    let mut tools = ToolsConfig::default();
    tools.drawio = Some("/nonexistent/drawio".to_string());
    tools.inkscape = Some("/nonexistent/inkscape".to_string());
    let pipeline = Pipeline::new(converter(ConvertConfig::default(), tools));

    let err = pipeline.run(diagrams.path(), true).await.unwrap_err();

    assert!(matches!(
        err,
        DrawportError::ToolNotFound {
            tool: Tool::Drawio,
            ..
        }
    ));
    assert!(!diagrams.path().join("a.svg").exists());
}
