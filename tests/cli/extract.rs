use anyhow::Result;

use crate::{CliTest, stderr, stdout};

fn setup_game(test: &CliTest) -> Result<()> {
    test.write_file(
        ".rpgtlrc.json",
        r#"{
            "scriptFilePatterns": ["plugins\\.js$"],
            "ignores": ["www/save"],
            "unsafePathPatterns": { "^System\\.json$": ["^switches"] }
        }"#,
    )?;
    test.write_file(
        "www/data/System.json",
        r#"{"gameTitle": "冒険の書", "switches": ["", "開始フラグ"]}"#,
    )?;
    test.write_file(
        "www/data/Map001.json",
        r#"{"displayName": "はじまりの村", "events": [null, {"note": "<メモ>;", "name": "EV001"}]}"#,
    )?;
    test.write_file("www/data/Tilesets.json", r#"{"name": "tiles"}"#)?;
    test.write_file("www/save/file1.json", r#"{"name": "セーブ"}"#)?;
    test.write_file(
        "www/js/plugins.js",
        "var title = \"冒険\";\nvar x = \"こんにちは\"; // c\n",
    )?;
    test.write_file("www/js/rpg_core.js", "var y = \"いいえ\";\n")?;
    Ok(())
}

#[test]
fn test_extract_lists_candidates_with_verdicts() -> Result<()> {
    let test = CliTest::new()?;
    setup_game(&test)?;

    let output = test.extract_command().output()?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(out.contains("System.json (structured)"));
    assert!(out.contains("gameTitle  safe"));
    assert!(out.contains("switches[1]  unsafe"));
    assert!(out.contains("displayName  safe"));
    assert!(out.contains("plugins.js (script)"));
    assert!(out.contains("1:12  safe"));
    // the literal alone is judged, not the statement around it
    assert!(out.contains("2:8  safe"));
    assert!(!out.contains("rpg_core.js"), "scripts need a matching pattern");
    assert!(!out.contains("セーブ"), "ignored paths are not scanned");
    assert!(!out.contains("Tilesets.json"));
    assert!(out.contains("Found 5 candidates in 3 files (4 safe, 1 unsafe, 3 ignored)"));

    Ok(())
}

#[test]
fn test_extract_show_ignored() -> Result<()> {
    let test = CliTest::new()?;
    setup_game(&test)?;

    let output = test.extract_command().arg("--show-ignored").output()?;
    let out = stdout(&output);

    assert!(out.contains("ignored: script code"));
    assert!(out.contains("ignored: no source text"));

    Ok(())
}

#[test]
fn test_extract_explicit_path() -> Result<()> {
    let test = CliTest::new()?;
    setup_game(&test)?;

    let output = test.extract_command().arg("www/data/Map001.json").output()?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(0));
    assert!(out.contains("Found 1 candidate in 1 file"));
    assert!(!out.contains("System.json"));

    Ok(())
}

#[test]
fn test_extract_malformed_file_exits_with_failure() -> Result<()> {
    let test = CliTest::new()?;
    setup_game(&test)?;
    test.write_file("www/data/Broken.json", "{\"name\": \"壊れた\"")?;

    let output = test.extract_command().arg("-v").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("Found 5 candidates in 3 files"));
    let err = stderr(&output);
    assert!(err.contains("Broken.json"));
    assert!(err.contains("1 file(s) could not be extracted"));

    Ok(())
}

#[test]
fn test_extract_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file(".rpgtlrc.json", r#"{ "scriptFilePatterns": ["("] }"#)?;

    let output = test.extract_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("scriptFilePatterns"));

    Ok(())
}
