/*!
# Lint Configuration

Per-rule enablement and severity overrides plus fix-loop limits, read from
a TOML file:

```toml
max_fix_iterations = 5

[rules.cast-to-as]
enabled = true

[rules.SL0007]
severity = "suggestion"
```

Rules are keyed by name or code. Anything not mentioned keeps the default
from the rule table.
*/

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::{RuleDescriptor, RuleId, Severity};
use crate::{LintError, Result};

/// File looked up in the working directory when no config is given.
pub const DEFAULT_CONFIG_FILE: &str = "sharplint.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    /// Upper bound on analyze-and-fix passes in `fix_until_stable`.
    pub max_fix_iterations: usize,
    pub rules: BTreeMap<String, RuleSetting>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_fix_iterations: 10,
            rules: BTreeMap::new(),
        }
    }
}

impl LintConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)
            .map_err(|e| LintError::Config(format!("{}: {e}", path.display())))?;
        debug!(path = %path.display(), rules = config.rules.len(), "loaded config");
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LintConfig =
            toml::from_str(text).map_err(|e| LintError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| LintError::Config(e.to_string()))
    }

    /// Rejects unknown rule keys and a zero iteration limit.
    pub fn validate(&self) -> Result<()> {
        if let Some(unknown) = self.rules.keys().find(|k| RuleId::from_name(k).is_none()) {
            return Err(LintError::Config(format!("unknown rule `{unknown}`")));
        }
        if self.max_fix_iterations == 0 {
            return Err(LintError::Config("max_fix_iterations must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Every entry naming `id`; a rule may appear under its name and its code.
    fn settings(&self, id: RuleId) -> impl Iterator<Item = &RuleSetting> {
        self.rules
            .iter()
            .filter(move |(key, _)| RuleId::from_name(key) == Some(id))
            .map(|(_, setting)| setting)
    }

    fn setting_mut(&mut self, id: RuleId) -> &mut RuleSetting {
        let key = self
            .rules
            .keys()
            .find(|k| RuleId::from_name(k) == Some(id))
            .cloned()
            .unwrap_or_else(|| id.name().to_string());
        self.rules.entry(key).or_default()
    }

    pub fn is_enabled(&self, descriptor: &RuleDescriptor) -> bool {
        self.settings(descriptor.id)
            .find_map(|s| s.enabled)
            .unwrap_or(descriptor.enabled_by_default)
    }

    pub fn severity_for(&self, descriptor: &RuleDescriptor) -> Severity {
        self.settings(descriptor.id)
            .find_map(|s| s.severity)
            .unwrap_or(descriptor.severity)
    }

    pub fn enable(&mut self, id: RuleId) {
        self.setting_mut(id).enabled = Some(true);
    }

    pub fn disable(&mut self, id: RuleId) {
        self.setting_mut(id).enabled = Some(false);
    }

    pub fn set_severity(&mut self, id: RuleId, severity: Severity) {
        self.setting_mut(id).severity = Some(severity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::descriptor;

    #[test]
    fn test_parse_config() {
        let config = LintConfig::from_toml_str(
            r#"
max_fix_iterations = 3

[rules.cast-to-as]
enabled = true

[rules.SL0007]
severity = "suggestion"
"#,
        )
        .unwrap();
        assert_eq!(config.max_fix_iterations, 3);
        assert!(config.is_enabled(descriptor(RuleId::CastToAs)));
        assert_eq!(config.severity_for(descriptor(RuleId::Goto)), Severity::Suggestion);
        assert_eq!(
            config.severity_for(descriptor(RuleId::DeadBranch)),
            descriptor(RuleId::DeadBranch).severity
        );
    }

    #[test]
    fn test_rejects_unknown_rules() {
        let err = LintConfig::from_toml_str("[rules.no-such-rule]\nenabled = false\n").unwrap_err();
        assert!(matches!(err, LintError::Config(ref m) if m.contains("no-such-rule")));
        assert!(LintConfig::from_toml_str("max_fix_iterations = 0").is_err());
        assert!(LintConfig::from_toml_str("[rules.goto]\nenabld = false\n").is_err());
    }

    #[test]
    fn test_overrides_by_code_are_updated_in_place() {
        let mut config = LintConfig::from_toml_str("[rules.SL0007]\nenabled = true\n").unwrap();
        config.disable(RuleId::Goto);
        assert_eq!(config.rules.len(), 1);
        assert!(!config.is_enabled(descriptor(RuleId::Goto)));
    }

    #[test]
    fn test_load_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let mut config = LintConfig::default();
        config.enable(RuleId::CastToAs);
        config.set_severity(RuleId::MissingDefault, Severity::Warning);
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(LintConfig::load(&path).unwrap(), config);
        assert!(matches!(
            LintConfig::load(&dir.path().join("missing.toml")),
            Err(LintError::Io(_))
        ));
    }
}
