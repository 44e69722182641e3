use std::fs;

use pretty_assertions::assert_eq;
use sharplint_cli::{run, CliArgs, Status};
use tempfile::TempDir;

const TERNARY: &str = "class C {\n    bool M(bool b) {\n        return b ? true : false;\n    }\n}\n";

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    dir
}

fn invoke(dir: &TempDir, args: &[&str]) -> anyhow::Result<(Status, String)> {
    let args = CliArgs::try_parse_from(std::iter::once("sharplint").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    let status = run(&args, dir.path(), &mut out)?;
    Ok((status, String::from_utf8(out)?))
}

#[test]
fn test_check_reports_locations() {
    let dir = workspace(&[("src/a.cs", TERNARY), ("src/b.cs", "class B { }\n")]);
    let (status, output) = invoke(&dir, &["check", "src"]).unwrap();
    assert_eq!(status, Status::Findings);
    assert!(output.contains("a.cs:3:16:"), "{output}");
    assert!(output.contains("SL0004 [redundant-ternary]"), "{output}");
    assert!(output.ends_with("1 diagnostic(s) in 2 file(s)\n"), "{output}");
    assert_eq!(fs::read_to_string(dir.path().join("src/a.cs")).unwrap(), TERNARY);
}

#[test]
fn test_fix_dry_run_leaves_files_alone() {
    let dir = workspace(&[("a.cs", TERNARY)]);
    let (status, output) = invoke(&dir, &["fix", "a.cs"]).unwrap();
    assert_eq!(status, Status::Findings);
    assert!(output.contains("would fix 1 issue(s)"), "{output}");
    assert_eq!(fs::read_to_string(dir.path().join("a.cs")).unwrap(), TERNARY);
}

#[test]
fn test_fix_write_rewrites_files() {
    let dir = workspace(&[("a.cs", TERNARY)]);
    let (status, output) = invoke(&dir, &["fix", "--write", "a.cs"]).unwrap();
    assert_eq!(status, Status::Clean);
    assert!(output.contains("fixed 1 issue(s)"), "{output}");
    assert_eq!(
        fs::read_to_string(dir.path().join("a.cs")).unwrap(),
        "class C {\n    bool M(bool b) {\n        return b;\n    }\n}\n"
    );

    let (status, _) = invoke(&dir, &["check", "a.cs"]).unwrap();
    assert_eq!(status, Status::Clean);
}

#[test]
fn test_json_output() {
    let dir = workspace(&[("a.cs", TERNARY)]);
    let (_, output) = invoke(&dir, &["check", "a.cs", "--format", "json"]).unwrap();
    let document: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(document["summary"]["diagnostics"], 1);
    let diagnostic = &document["files"][0]["diagnostics"][0];
    assert_eq!(diagnostic["rule"], "redundant-ternary");
    assert_eq!(diagnostic["code"], "SL0004");
    assert_eq!(diagnostic["line"], 3);
    assert_eq!(diagnostic["column"], 16);
}

#[test]
fn test_config_file_in_working_directory() {
    let dir = workspace(&[
        ("a.cs", TERNARY),
        ("sharplint.toml", "[rules.redundant-ternary]\nenabled = false\n"),
    ]);
    let (status, _) = invoke(&dir, &["check", "a.cs"]).unwrap();
    assert_eq!(status, Status::Clean);

    let (status, _) = invoke(&dir, &["check", "a.cs", "--enable", "SL0004"]).unwrap();
    assert_eq!(status, Status::Findings);
}

#[test]
fn test_bad_options_are_errors() {
    let dir = workspace(&[("a.cs", TERNARY), ("broken.toml", "max_fix_iterations = 0\n")]);
    assert!(invoke(&dir, &["check", "a.cs", "--disable", "no-such-rule"]).is_err());
    assert!(invoke(&dir, &["check", "a.cs", "--config", "broken.toml"]).is_err());
    assert!(invoke(&dir, &["check", "missing"]).is_err());
}

#[test]
fn test_unparsable_file_is_reported() {
    let dir = workspace(&[("bad.cs", "class {\n")]);
    let (status, output) = invoke(&dir, &["fix", "bad.cs"]).unwrap();
    assert_eq!(status, Status::Findings);
    assert!(output.contains("bad.cs:1:"), "{output}");
    assert!(output.contains("error:"), "{output}");
    assert!(output.contains("1 file(s) could not be parsed"), "{output}");
}

#[test]
fn test_rules_listing() {
    let dir = workspace(&[]);
    let (status, output) = invoke(&dir, &["rules", "--enable", "cast-to-as"]).unwrap();
    assert_eq!(status, Status::Clean);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 13);
    assert!(lines[0].starts_with("SL0001  as-to-cast"));
    assert!(lines[1].contains("cast-to-as"));
    assert!(lines[1].contains(" on "));
    assert!(lines[6].contains("goto"));
    assert!(lines[6].contains(" - "));
}
