//! End-to-end behavior of the store and accessor layer
//!
//! Each test works against its own temporary data root with templates
//! bundled in memory, the way a plugin embeds them in its jar.

use std::fs;

use proptest::prelude::*;
use tempfile::TempDir;
use xconfig::access::ConfigHandler;
use xconfig::storage::{ConfigStore, EmbeddedTemplates, Materialized, StoreError};

fn templates() -> EmbeddedTemplates {
    EmbeddedTemplates::new()
        .with("config.yml", "greeting: hello\n")
        .with("lang/en.yml", "welcome: \"&aWelcome!\"\n")
}

fn store_in(dir: &TempDir) -> ConfigStore {
    ConfigStore::with_templates(dir.path(), templates())
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn scenario_a_template_backed_text() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.build("", "config.yml", false).unwrap();

    let handler = ConfigHandler::new(&store);
    assert_eq!(handler.text("", "config.yml", "greeting", false).as_deref(), Some("hello"));
}

#[test]
fn scenario_b_custom_file_created_empty() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    let how = store.build("sub", "custom.yml", true).unwrap();
    assert_eq!(how, Materialized::Created);

    let path = dir.path().join("sub").join("custom.yml");
    assert!(path.is_file());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");

    let handler = ConfigHandler::new(&store);
    assert!(!handler.contains("sub", "custom.yml", "anything"));
}

#[test]
fn scenario_c_write_save_reload() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.build("", "config.yml", false).unwrap();
    store.write("", "config.yml", "greeting", "bye").unwrap();
    store.save("", "config.yml").unwrap();
    store.reload("", "config.yml").unwrap();

    let handler = ConfigHandler::new(&store);
    assert_eq!(handler.text("", "config.yml", "greeting", false).as_deref(), Some("bye"));
}

#[test]
fn scenario_d_missing_template() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    let err = store.build("", "missing.yml", false).unwrap_err();
    assert!(matches!(err, StoreError::ResourceMissing(ref name) if name == "missing.yml"));
    assert!(!store.exists("", "missing.yml"));
    assert!(!dir.path().join("missing.yml").exists());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn exists_only_for_fully_built_keys() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    // The file already on disk is malformed, so it is found but fails to parse.
    fs::write(dir.path().join("config.yml"), "greeting: [oops").unwrap();
    assert!(store.build("", "config.yml", false).is_err());
    assert!(!store.exists("", "config.yml"));
    assert!(store.path("", "config.yml").is_none());
    assert!(store.get("", "config.yml").is_none());

    store.build("lang", "en.yml", false).unwrap();
    assert!(store.exists("lang", "en.yml"));
    assert!(store.path("lang", "en.yml").is_some());
    assert!(store.get("lang", "en.yml").is_some());
}

#[test]
fn second_build_does_not_copy_template_again() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let path = dir.path().join("config.yml");

    assert_eq!(store.build("", "config.yml", false).unwrap(), Materialized::FromTemplate);
    fs::write(&path, "greeting: customized\n").unwrap();

    assert_eq!(store.build("", "config.yml", false).unwrap(), Materialized::Existing);
    assert_eq!(fs::read_to_string(&path).unwrap(), "greeting: customized\n");

    let handler = ConfigHandler::new(&store);
    assert_eq!(
        handler.text("", "config.yml", "greeting", false).as_deref(),
        Some("customized")
    );
}

#[test]
fn reads_from_unbuilt_key_are_missing() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    let handler = ConfigHandler::new(&store);

    assert!(store.get("", "config.yml").is_none());
    assert_eq!(handler.text("", "config.yml", "greeting", false), None);
    assert_eq!(handler.number("", "config.yml", "greeting"), None);
    assert_eq!(handler.text_list("", "config.yml", "greeting", false), None);
}

#[test]
fn delete_consistency() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);
    let path = dir.path().join("lang").join("en.yml");

    store.build("lang", "en.yml", false).unwrap();
    store.delete("lang", "en.yml").unwrap();
    assert!(!store.exists("lang", "en.yml"));
    assert!(!path.exists());

    // A directory where the file was can't be removed as a file.
    store.build("lang", "en.yml", false).unwrap();
    fs::remove_file(&path).unwrap();
    fs::create_dir(&path).unwrap();
    fs::write(path.join("marker"), "still here").unwrap();

    assert!(matches!(store.delete("lang", "en.yml"), Err(StoreError::Io { .. })));
    assert!(store.exists("lang", "en.yml"));
    assert_eq!(fs::read_to_string(path.join("marker")).unwrap(), "still here");
}

#[test]
fn colorized_text_from_subfolder() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.build("lang", "en.yml", false).unwrap();
    let handler = ConfigHandler::new(&store);

    assert_eq!(
        handler.text("lang", "en.yml", "welcome", true).as_deref(),
        Some("§aWelcome!")
    );
}

#[test]
fn typed_round_trip_through_disk() {
    let dir = TempDir::new().unwrap();
    let mut store = store_in(&dir);

    store.build("sub", "stats.yml", true).unwrap();
    store.write("sub", "stats.yml", "players.max", 64).unwrap();
    store.write("sub", "stats.yml", "players.ratio", 0.5).unwrap();
    store.write("sub", "stats.yml", "pvp", true).unwrap();
    store.write("sub", "stats.yml", "motd", vec!["&aone", "two"]).unwrap();
    store.save("sub", "stats.yml").unwrap();

    // A fresh store sees only what reached the disk.
    let mut fresh = store_in(&dir);
    fresh.build("sub", "stats.yml", true).unwrap();
    let handler = ConfigHandler::new(&fresh);

    assert_eq!(handler.number("sub", "stats.yml", "players.max"), Some(64));
    assert_eq!(handler.double("sub", "stats.yml", "players.ratio"), Some(0.5));
    assert_eq!(handler.boolean("sub", "stats.yml", "pvp"), Some(true));
    assert_eq!(
        handler.text_list("sub", "stats.yml", "motd", true),
        Some(vec!["§aone".to_string(), "two".to_string()])
    );
    assert_eq!(handler.section_keys("sub", "stats.yml", "players"), vec!["max", "ratio"]);
}

proptest! {
    #[test]
    fn text_round_trip(
        segments in prop::collection::vec("[a-z][a-z0-9_-]{0,7}", 1..4),
        value in "v_[a-zA-Z0-9 ]{0,16}[a-zA-Z0-9]",
    ) {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let path = segments.join(".");

        store.build("", "config.yml", false).unwrap();
        store.write("", "config.yml", &path, value.as_str()).unwrap();
        store.save("", "config.yml").unwrap();
        store.reload("", "config.yml").unwrap();

        let handler = ConfigHandler::new(&store);
        prop_assert_eq!(handler.text("", "config.yml", &path, false), Some(value));
    }

    #[test]
    fn number_round_trip(
        segments in prop::collection::vec("[a-z][a-z0-9_]{0,7}", 1..4),
        value in any::<i64>(),
    ) {
        let dir = TempDir::new().unwrap();
        let mut store = store_in(&dir);
        let path = segments.join(".");

        store.build("data", "numbers.yml", true).unwrap();
        store.write("data", "numbers.yml", &path, value).unwrap();
        store.save("data", "numbers.yml").unwrap();
        store.reload("data", "numbers.yml").unwrap();

        let handler = ConfigHandler::new(&store);
        prop_assert_eq!(handler.number("data", "numbers.yml", &path), Some(value));
    }
}
