//! Controller configuration loaded from files on disk.

use notebot_common::config::{ConfigError, LogLevel};
use notebot_common::consts::DEFAULT_CYCLE_TIME;
use notebot_common::field::Alliance;
use notebot_control::autonomous::catalogue::{PODIUM_SPEAKER_AMP, SPEAKER_CENTRE_3};
use notebot_control::config::load_config;
use notebot_control::controller::NoteTimings;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("notebot.toml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn shipped_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/notebot.toml");
    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.cycle_time, DEFAULT_CYCLE_TIME);
    assert_eq!(loaded.timings, NoteTimings::default());
    assert_eq!(loaded.routine.name(), PODIUM_SPEAKER_AMP);
    assert_eq!(loaded.config.shared.log_level, LogLevel::Info);
}

#[test]
fn blue_routine_is_mirrored_at_load() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        &format!(
            r#"
alliance = "blue"
routine = "{SPEAKER_CENTRE_3}"

[shared]
service_name = "notebot-blue"
"#
        ),
    );
    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config.alliance, Alliance::Blue);
    let start = loaded.routine.start_pose().unwrap();
    assert!(start.translation.x < 8.0);
    for leg in loaded.routine.legs() {
        assert!(leg.shoot_path.end().x < 8.5);
    }
}

#[test]
fn missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        load_config(&dir.path().join("absent.toml")),
        Err(ConfigError::FileNotFound)
    ));
}

#[test]
fn unknown_alliance_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        dir.path(),
        "alliance = \"green\"\n[shared]\nservice_name = \"notebot\"\n",
    );
    assert!(matches!(load_config(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn empty_service_name_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "[shared]\nservice_name = \"  \"\n");
    assert!(matches!(
        load_config(&path),
        Err(ConfigError::ValidationError(_))
    ));
}
