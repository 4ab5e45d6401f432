use std::process::Stdio;

use anyhow::Result;
use serde_json::json;

use crate::{CliTest, stderr, stdout};

fn setup_store(test: &CliTest) -> Result<()> {
    test.write_file(
        ".rpgtlrc.json",
        r#"{
            "storePath": "store.json",
            "translatedReplace": [{"from": "Adventure", "to": "Quest"}]
        }"#,
    )?;
    let store = json!({
        test.project_key(): {
            "structuredFiles": {
                "www/data/System.json": {
                    "gameTitle": {"value": "冒険の書", "path": "gameTitle", "translated": "Book of Adventure"},
                    "terms.commands[0]": {"value": "はい", "path": "terms.commands[0]", "translated": null},
                    "terms.commands[1]": {"value": "いいえ", "path": "terms.commands[1]", "translated": "いいえ"}
                }
            },
            "scriptFiles": {}
        }
    });
    test.write_file("store.json", &serde_json::to_string_pretty(&store)?)
}

#[test]
fn test_clean_selected_rules() -> Result<()> {
    let test = CliTest::new()?;
    setup_store(&test)?;

    let output = test
        .clean_command()
        .args(["--rule", "replace", "--rule", "untranslated"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    // always run in canonical order
    let untranslated = out.find("untranslated  removed 2 record(s)");
    let replace = out.find("replace       updated 1 record(s)");
    assert!(untranslated.is_some(), "stdout: {}", out);
    assert!(replace.is_some(), "stdout: {}", out);
    assert!(untranslated < replace);
    assert!(!out.contains("names"));

    let store = test.read_json("store.json")?;
    let records = &store[test.project_key()]["structuredFiles"]["www/data/System.json"];
    assert_eq!(records["gameTitle"]["translated"], "Book of Quest");
    assert!(records.get("terms.commands[0]").is_none());
    assert!(records.get("terms.commands[1]").is_none());

    Ok(())
}

#[test]
fn test_clean_runs_every_rule_by_default() -> Result<()> {
    let test = CliTest::new()?;
    setup_store(&test)?;

    let output = test.clean_command().stdin(Stdio::null()).output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    for rule in ["untranslated", "code", "unsafe", "replace", "inconsistencies", "names"] {
        assert!(out.contains(rule), "missing '{}' in: {}", rule, out);
    }

    Ok(())
}

#[test]
fn test_clean_without_store_is_a_no_op() -> Result<()> {
    let test = CliTest::with_file(".rpgtlrc.json", r#"{"storePath": "store.json"}"#)?;

    let output = test
        .clean_command()
        .args(["--rule", "untranslated"])
        .output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("removed 0 record(s)"));

    Ok(())
}

#[test]
fn test_clean_rejects_corrupt_store() -> Result<()> {
    let test = CliTest::with_file(".rpgtlrc.json", r#"{"storePath": "store.json"}"#)?;
    test.write_file("store.json", "{ not json")?;

    let output = test.clean_command().output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to parse translation store"));
    assert_eq!(test.read_file("store.json")?, "{ not json");

    Ok(())
}
