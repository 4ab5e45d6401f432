use anyhow::Result;
use serde_json::{Value, json};

use crate::{CliTest, stderr, stdout};

fn store_with(key: &str, translated: &str) -> Value {
    json!({
        key: {
            "structuredFiles": {
                "www/data/Map001.json": {
                    "displayName": {"value": "はじまりの村", "path": "displayName", "translated": translated}
                }
            }
        }
    })
}

fn setup(test: &CliTest) -> Result<()> {
    test.write_file(".rpgtlrc.json", r#"{"storePath": "store.json"}"#)?;
    test.write_file(
        "store.json",
        &store_with(&test.project_key(), "Starting Village").to_string(),
    )
}

#[test]
fn test_merge_takes_other_translations() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;
    test.write_file(
        "other.json",
        &store_with(&test.project_key(), "Village of Beginnings").to_string(),
    )?;

    let output = test.command().args(["merge", "other.json"]).output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Merged 1 translation(s) from other.json"));

    let store = test.read_json("store.json")?;
    assert_eq!(
        store[test.project_key()]["structuredFiles"]["www/data/Map001.json"]["displayName"]
            ["translated"],
        "Village of Beginnings"
    );

    Ok(())
}

#[test]
fn test_merge_missing_file() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;

    let output = test.command().args(["merge", "nowhere.json"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("does not exist"));

    Ok(())
}

#[test]
fn test_merge_other_project_fails() -> Result<()> {
    let test = CliTest::new()?;
    setup(&test)?;
    test.write_file(
        "other.json",
        &store_with("/somewhere/else", "Village of Beginnings").to_string(),
    )?;

    let output = test.command().args(["merge", "other.json"]).output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("holds no translations"));

    let store = test.read_json("store.json")?;
    assert_eq!(
        store[test.project_key()]["structuredFiles"]["www/data/Map001.json"]["displayName"]
            ["translated"],
        "Starting Village"
    );

    Ok(())
}
