use assert_cmd::Command;
use predicates::prelude::*;

fn sample_csv(dir: &std::path::Path) -> anyhow::Result<std::path::PathBuf> {
    let mut csv = String::from("player,level,text\n");
    for i in 0..30 {
        csv.push_str(&format!("bob,1,bob says {i}\n"));
    }
    for i in 0..5 {
        csv.push_str(&format!("amy,2,amy says {i}\n"));
    }
    let path = dir.join("chat.csv");
    std::fs::write(&path, csv)?;
    Ok(path)
}

fn text_replay() -> anyhow::Result<Command> {
    let mut cmd = Command::cargo_bin("text-replay")?;
    cmd.env("TEXT_REPLAY_LOG_LEVEL", "off");
    Ok(cmd)
}

#[test]
fn test_browse_and_navigate() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;

    text_replay()?
        .arg(&path)
        .write_stdin("group player\ntext text\nnext\nnext\nnext\nprev\nprev\nprev\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("File uploaded successfully! (35 rows, 3 columns)"))
        .stdout(predicate::str::contains("Players: All, amy, bob"))
        .stdout(predicate::str::contains("Group amy (Rows 1-5) | Group 1 of 2"))
        .stdout(predicate::str::contains("Group bob (Rows 26-30) | Group 2 of 2"))
        .stdout(predicate::str::contains("You have reached the end of the dataset."))
        .stdout(predicate::str::contains("You are at the beginning of the dataset."));
    Ok(())
}

#[test]
fn test_tag_and_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;
    let out = dir.path().join("Codes.csv");

    let script = format!(
        "group player level\ntext text\nfilter --player bob\ntag \"good one\" 0 3\nsummary\nexport {}\n",
        out.display()
    );
    text_replay()?
        .arg(&path)
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Levels: All, 1, 2"))
        .stdout(predicate::str::contains("1 groups visible."))
        .stdout(predicate::str::contains("- 'good one': 25 total rows, 2 selected"))
        .stdout(predicate::str::contains("Exported to"));

    let exported = std::fs::read_to_string(&out)?;
    let mut lines = exported.lines();
    assert_eq!(lines.next(), Some("player,level,text,original_index,good one"));
    assert_eq!(lines.next(), Some("bob,1,bob says 0,0,True"));
    assert_eq!(exported.lines().count(), 36);
    assert!(exported.contains("amy,2,amy says 4,34,False"));
    Ok(())
}

#[test]
fn test_export_without_positive_labels_warns() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;

    text_replay()?
        .arg(&path)
        .current_dir(dir.path())
        .write_stdin("group player\ntag nothing\nexport\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Warning: No rows have been tagged to download.",
        ));
    assert!(!dir.path().join("Codes.csv").exists());
    Ok(())
}

#[test]
fn test_config_allows_negative_only_export() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;
    let config = dir.path().join("config.json");
    std::fs::write(
        &config,
        r#"{"export":{"require_positive_labels":false,"file_name":"labels.csv"}}"#,
    )?;

    text_replay()?
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .current_dir(dir.path())
        .write_stdin("group player\ntag nothing\nexport\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to labels.csv"));
    assert!(dir.path().join("labels.csv").exists());
    Ok(())
}

#[test]
fn test_bad_upload_keeps_previous_dataset() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;
    let broken = dir.path().join("broken.csv");
    std::fs::write(&broken, "a,b\n1,2,3\n")?;

    text_replay()?
        .arg(&path)
        .write_stdin(format!("load {}\ncolumns\n", broken.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: Error parsing file"))
        .stdout(predicate::str::contains("Columns: player, level, text"));
    Ok(())
}

#[test]
fn test_seeded_random_jump() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = sample_csv(dir.path())?;

    text_replay()?
        .args([path.to_string_lossy().as_ref(), "--seed", "7"])
        .write_stdin("group player\ntext text\nrandom\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Jumped to a random selection!"));
    Ok(())
}
