/*!
# Fix Integration Tests

Exact post-fix text for every fix provider, plus the properties every fix
must keep: the output reparses, the rule does not fire again, and nothing
outside the target node changes.
*/

use pretty_assertions::assert_eq;
use sharplint_core::{parse, LintConfig, LintError, Linter, RuleId};

fn linter_with(rules: &[RuleId]) -> Linter {
    let mut config = LintConfig::default();
    for id in RuleId::ALL {
        if rules.contains(&id) {
            config.enable(id);
        } else {
            config.disable(id);
        }
    }
    Linter::new(config).expect("valid config")
}

/// Applies the fix for the first diagnostic of `rule` and checks the
/// properties shared by all fixes before handing back the new text.
fn fix_first(rule: RuleId, source: &str) -> anyhow::Result<String> {
    let linter = linter_with(&[rule]);
    let tree = linter.parse(source)?;
    let diagnostics = linter.analyze(&tree);
    let diagnostic = diagnostics
        .first()
        .ok_or_else(|| anyhow::anyhow!("{rule} did not fire"))?;
    let fix = linter
        .available_fix(diagnostic, &tree)?
        .ok_or_else(|| anyhow::anyhow!("{rule} offered no fix"))?;
    let fixed = linter.apply_fix(&tree, &fix)?;
    let text = fixed.text();

    let reparsed = parse(&text);
    assert!(reparsed.is_ok(), "fixed text does not parse: {:?}\n{text}", reparsed.errors);
    let again = linter.analyze(&reparsed.tree);
    assert_eq!(again.len(), diagnostics.len() - 1, "{rule} still fires on\n{text}");
    Ok(text)
}

#[test]
fn test_dead_branch_statement_is_deleted() -> anyhow::Result<()> {
    let source = "class C {\n    void M(bool b) {\n        if (false) { b = false; }\n        b = true;\n    }\n}\n";
    assert_eq!(
        fix_first(RuleId::DeadBranch, source)?,
        "class C {\n    void M(bool b) {\n        b = true;\n    }\n}\n"
    );
    Ok(())
}

#[test]
fn test_dead_branch_keeps_the_else_statement() -> anyhow::Result<()> {
    let source = "class C {\n    void M(bool b) {\n        if (false) b = true; else b = false;\n    }\n}\n";
    assert_eq!(
        fix_first(RuleId::DeadBranch, source)?,
        "class C {\n    void M(bool b) {\n        b = false;\n    }\n}\n"
    );
    Ok(())
}

#[test]
fn test_redundant_ternary_collapses_to_condition() -> anyhow::Result<()> {
    let source = "class C { bool M(bool cond) { return cond ? true : false; } }";
    assert_eq!(
        fix_first(RuleId::RedundantTernary, source)?,
        "class C { bool M(bool cond) { return cond; } }"
    );
    Ok(())
}

#[test]
fn test_as_becomes_cast() -> anyhow::Result<()> {
    let source = "class C { void M(object o) { var n = o as int?; } }";
    assert_eq!(
        fix_first(RuleId::AsToCast, source)?,
        "class C { void M(object o) { var n = (int?)o; } }"
    );
    Ok(())
}

#[test]
fn test_as_to_cast_parenthesizes_where_needed() -> anyhow::Result<()> {
    let source = "class C { object Get() { return null; } void M(int n) { var m = -n as object; } }";
    assert_eq!(
        fix_first(RuleId::AsToCast, source)?,
        "class C { object Get() { return null; } void M(int n) { var m = (object)(-n); } }"
    );

    let source = "class C { object Get() { return null; } void M() { var s = Get() as string; } }";
    assert_eq!(
        fix_first(RuleId::AsToCast, source)?,
        "class C { object Get() { return null; } void M() { var s = (string)Get(); } }"
    );
    Ok(())
}

#[test]
fn test_cast_becomes_as() -> anyhow::Result<()> {
    let source = "class C { void Use(string s) { } void M(object o) { Use((string)o); } }";
    assert_eq!(
        fix_first(RuleId::CastToAs, source)?,
        "class C { void Use(string s) { } void M(object o) { Use(o as string); } }"
    );

    let source = "class C { void M(object o) { var n = ((string)o).Length; } }";
    assert_eq!(
        fix_first(RuleId::CastToAs, source)?,
        "class C { void M(object o) { var n = (o as string).Length; } }"
    );
    Ok(())
}

#[test]
fn test_stale_timestamp_uses_utc() -> anyhow::Result<()> {
    let source = "using System;\nclass C { DateTime M() { return System.DateTime.Now; } }\n";
    assert_eq!(
        fix_first(RuleId::StaleTimestamp, source)?,
        "using System;\nclass C { DateTime M() { return System.DateTime.UtcNow; } }\n"
    );
    Ok(())
}

#[test]
fn test_trivial_constructor_is_removed() -> anyhow::Result<()> {
    let source = "class C {\n    public C() { }\n    void M() { }\n}\n";
    assert_eq!(
        fix_first(RuleId::TrivialConstructor, source)?,
        "class C {\n    void M() { }\n}\n"
    );
    Ok(())
}

#[test]
fn test_missing_default_follows_section_layout() -> anyhow::Result<()> {
    let source = "class C {\n    void M(int n) {\n        switch (n) {\n            case 1:\n                break;\n        }\n    }\n}\n";
    assert_eq!(
        fix_first(RuleId::MissingDefault, source)?,
        "class C {\n    void M(int n) {\n        switch (n) {\n            case 1:\n                break;\n            default:\n                throw new NotImplementedException();\n        }\n    }\n}\n"
    );

    let source = "class C { void M(int n) { switch (n) { case 1: break; } } }";
    assert_eq!(
        fix_first(RuleId::MissingDefault, source)?,
        "class C { void M(int n) { switch (n) { case 1: break; default: throw new NotImplementedException(); } } }"
    );
    Ok(())
}

#[test]
fn test_missing_default_does_not_copy_comments() -> anyhow::Result<()> {
    let source = "class C {\n    void M(int n) {\n        switch (n) {\n            case 1: // one\n                break; // done\n        }\n    }\n}\n";
    let fixed = fix_first(RuleId::MissingDefault, source)?;
    assert_eq!(
        fixed,
        "class C {\n    void M(int n) {\n        switch (n) {\n            case 1: // one\n                break; // done\n            default:\n                throw new NotImplementedException();\n        }\n    }\n}\n"
    );
    assert_eq!(fixed.matches("// one").count(), 1);
    assert_eq!(fixed.matches("// done").count(), 1);
    Ok(())
}

#[test]
fn test_explicit_type_becomes_var() -> anyhow::Result<()> {
    let source = "class C { void M() { int x = 0; } }";
    assert_eq!(
        fix_first(RuleId::ExplicitToVar, source)?,
        "class C { void M() { var x = 0; } }"
    );
    Ok(())
}

#[test]
fn test_replacement_leaves_siblings_untouched() -> anyhow::Result<()> {
    let source = "class C {\n    bool M(bool a, object o) {\n        var s = o as string; // keep\n        var t = a ? true : false;\n        return t;\n    }\n}\n";
    let linter = linter_with(&[RuleId::RedundantTernary]);
    let tree = linter.parse(source)?;
    let diagnostic = linter.analyze(&tree).remove(0);
    let fix = linter
        .available_fix(&diagnostic, &tree)?
        .ok_or_else(|| anyhow::anyhow!("no fix"))?;
    let text = linter.apply_fix(&tree, &fix)?.text();

    let (before, after) = (&source[..diagnostic.span.start], &source[diagnostic.span.end..]);
    assert!(text.starts_with(before));
    assert!(text.ends_with(after));
    assert_eq!(&text[before.len()..text.len() - after.len()], "a");
    Ok(())
}

#[test]
fn test_rules_without_providers_offer_nothing() -> anyhow::Result<()> {
    let source = "class C { void M() { again: goto again; } }";
    let linter = linter_with(&[RuleId::Goto]);
    let tree = linter.parse(source)?;
    let diagnostics = linter.analyze(&tree);
    assert_eq!(diagnostics.len(), 1);
    assert!(linter.available_fix(&diagnostics[0], &tree)?.is_none());
    Ok(())
}

#[test]
fn test_fix_against_another_snapshot_is_rejected() -> anyhow::Result<()> {
    let source = "class C { bool M(bool c) { return c ? true : false; } }";
    let linter = linter_with(&[RuleId::RedundantTernary]);
    let first = linter.parse(source)?;
    let second = linter.parse(source)?;
    let diagnostic = linter.analyze(&first).remove(0);
    let fix = linter
        .available_fix(&diagnostic, &first)?
        .ok_or_else(|| anyhow::anyhow!("no fix"))?;

    assert!(matches!(linter.available_fix(&diagnostic, &second), Err(LintError::StaleSnapshot { .. })));
    assert!(matches!(linter.apply_fix(&second, &fix), Err(LintError::StaleSnapshot { .. })));
    Ok(())
}

#[test]
fn test_fix_until_stable_applies_independent_fixes_together() -> anyhow::Result<()> {
    let source = r#"using System;
class C {
    public C() { }
    DateTime M(object o, bool b) {
        var s = o as string;
        if (false) { b = false; }
        return DateTime.Now;
    }
}
"#;
    let linter = Linter::default();
    let outcome = linter.fix_until_stable(source)?;
    assert_eq!(
        outcome.text(),
        r#"using System;
class C {
    DateTime M(object o, bool b) {
        var s = (string)o;
        return DateTime.UtcNow;
    }
}
"#
    );
    assert_eq!(outcome.applied.len(), 4);
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.remaining.is_empty());
    assert!(outcome.changed());
    Ok(())
}

#[test]
fn test_fix_files_does_not_write() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("c.cs");
    let source = "class C { bool M(bool c) { return c ? true : false; } }\n";
    std::fs::write(&path, source)?;

    let linter = Linter::default();
    let outcomes = linter.fix_files(std::slice::from_ref(&path));
    let outcome = outcomes.into_iter().next().ok_or_else(|| anyhow::anyhow!("no outcome"))??;
    assert_eq!(outcome.text(), "class C { bool M(bool c) { return c; } }\n");
    assert_eq!(std::fs::read_to_string(&path)?, source);
    Ok(())
}
