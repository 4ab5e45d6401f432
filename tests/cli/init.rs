use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(0));
    assert!(stdout(&output).contains("Created .rpgtlrc.json"));

    let content = test.read_file(".rpgtlrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    for field in [
        "projectRoot",
        "translationThreads",
        "tokenBudget",
        "phraseMaxLength",
        "unsafePathPatterns",
        "translatedReplace",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{}'", field);
    }
    assert_eq!(parsed["translationThreads"], 4);

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".rpgtlrc.json", "{}")?;

    let output = test.command().arg("init").output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".rpgtlrc.json already exists"));
    assert_eq!(test.read_file(".rpgtlrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("www/data/Map001.json", r#"{"displayName": "はじまりの村"}"#)?;

    let output = test.extract_command().output()?;
    assert!(
        output.status.success(),
        "extract should work with the initialized config. stderr: {}",
        stderr(&output)
    );

    Ok(())
}
