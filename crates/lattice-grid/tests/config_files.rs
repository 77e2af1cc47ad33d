//! Loading grid configuration from files.

use std::io::Write;

use lattice_grid::prelude::*;
use tempfile::{Builder, NamedTempFile};

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const TOML_OPTIONS: &str = r#"
title = "Team"
sortingEnabled = true
searchEnabled = true
dateFormat = "yyyy-MM-dd"
initialSortKey = "joined"
initialSortDescending = true

[providedContext]
team = "core"

[[columns]]
width = 4
label = "Name"
field = "name"

[[columns]]
width = 3
label = "Joined"
field = "joined"
isDate = true

[[columns]]
width = 2
customContent = "{{context.team}}/{{record.id}}"
"#;

#[test]
fn test_load_toml_and_render() {
    let file = write_temp(".toml", TOML_OPTIONS);
    let config = GridConfig::load(file.path()).unwrap();
    assert_eq!(config.title(), Some("Team"));
    assert_eq!(config.date_format(), "yyyy-MM-dd");

    let source = SourceList::from_json(&serde_json::json!([
        {"id": 1, "name": "Ann", "joined": "2021-05-01T09:00:00"},
        {"id": 2, "name": "Bo", "joined": "2023-01-15T09:00:00"}
    ]))
    .unwrap();
    let grid = DataGrid::new(config, source.into(), TextTemplateHost).unwrap();

    let first = &grid.rows()[0];
    assert_eq!(first.cells[0].node, "Bo");
    assert_eq!(first.cells[1].node, "2023-01-15");
    assert_eq!(first.cells[2].node, "core/2");
    assert_eq!(grid.header().cells[1].sort, SortIndicator::Descending);
}

#[test]
fn test_load_json() {
    let file = write_temp(
        ".json",
        r#"{"maxItems": 1, "identityField": "uid", "columns": [{"width": 1, "field": "uid"}]}"#,
    );
    let options = GridOptions::load(file.path()).unwrap();
    assert_eq!(options.max_items, Some(1));
    assert_eq!(options.identity_field, "uid");
    assert_eq!(options.columns.len(), 1);
}

#[test]
fn test_load_errors() {
    let file = write_temp(".yaml", "title: nope");
    assert!(matches!(
        GridOptions::load(file.path()),
        Err(GridError::UnsupportedFormat(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(GridOptions::load(&missing), Err(GridError::Io { .. })));

    let file = write_temp(".toml", "columns = [");
    assert!(matches!(GridOptions::load(file.path()), Err(GridError::Toml(_))));
}

#[test]
fn test_loaded_config_still_validated() {
    let file = write_temp(".toml", "[[columns]]\nwidth = 0\nfield = \"name\"\n");
    let config = GridConfig::load(file.path()).unwrap();
    let result = DataGrid::new(config, SourceList::shared(Vec::new()), TextTemplateHost);
    assert!(matches!(result, Err(GridError::InvalidColumn { index: 0, .. })));
}
