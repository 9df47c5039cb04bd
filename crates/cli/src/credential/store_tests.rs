// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn record() -> CredentialRecord {
    CredentialRecord {
        access_token: "access-1".to_owned(),
        refresh_token: "refresh-1".to_owned(),
        expires_at: 1_700_000_000_000,
        user_id: "10129".to_owned(),
        first_name: Some("Ada".to_owned()),
        last_name: Some("Lovelace".to_owned()),
    }
}

#[test]
fn missing_file_loads_as_none() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = CredentialStore::new(tmp.path().join("tokens.json"));
    assert_eq!(store.load(), None);
    Ok(())
}

#[test]
fn malformed_file_loads_as_none() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("tokens.json");
    std::fs::write(&path, "{not json")?;
    assert_eq!(CredentialStore::new(&path).load(), None);

    std::fs::write(&path, r#"{"accessToken":"only"}"#)?;
    assert_eq!(CredentialStore::new(&path).load(), None);
    Ok(())
}

#[test]
fn save_then_load_round_trips() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = CredentialStore::new(tmp.path().join("tokens.json"));
    store.save(&record())?;
    assert_eq!(store.load(), Some(record()));
    Ok(())
}

#[test]
fn save_creates_missing_directories() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("nested").join(".whoop-mcp").join("tokens.json");
    let store = CredentialStore::new(&path);
    store.save(&record())?;
    assert!(path.exists());
    // Second save into an existing directory is fine too.
    store.save(&record())?;
    Ok(())
}

#[test]
fn save_fully_replaces_previous_record() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = CredentialStore::new(tmp.path().join("tokens.json"));
    store.save(&record())?;

    let shorter = CredentialRecord {
        access_token: "a".to_owned(),
        first_name: None,
        last_name: None,
        ..record()
    };
    store.save(&shorter)?;
    assert_eq!(store.load(), Some(shorter));
    Ok(())
}

#[test]
fn save_leaves_no_temp_files() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = CredentialStore::new(tmp.path().join("tokens.json"));
    store.save(&record())?;
    store.save(&record())?;

    let names: Vec<String> = std::fs::read_dir(tmp.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["tokens.json".to_owned()]);
    Ok(())
}

#[test]
fn saved_file_is_pretty_json() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let store = CredentialStore::new(tmp.path().join("tokens.json"));
    store.save(&record())?;
    let text = std::fs::read_to_string(store.path())?;
    assert!(text.contains("\n  \"accessToken\": \"access-1\""));
    Ok(())
}
