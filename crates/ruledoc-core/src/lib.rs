use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed documentation file name inside each rule directory.
pub const DOC_FILE: &str = "README.md";

/// Relative path of the aggregate rules file under the engine checkout,
/// used when settings don't name one.
pub const DEFAULT_RULES_FILE: &str = "src/rules.ts";

// --- Errors ---

/// Startup-class failures. Any of these aborts the whole run; per-rule
/// problems are plain strings and never abort.
#[derive(Debug)]
pub enum FatalError {
    MissingConfig(String),
    DirectoryRead { path: PathBuf, reason: String },
    SourceNotFound { path: PathBuf, reason: String },
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FatalError::MissingConfig(what) => write!(f, "missing configuration: {what}"),
            FatalError::DirectoryRead { path, reason } => {
                write!(f, "cannot scan {}: {}", path.display(), reason)
            }
            FatalError::SourceNotFound { path, reason } => {
                write!(f, "cannot read rule source {}: {}", path.display(), reason)
            }
        }
    }
}

// --- Rule discovery ---

/// A rule directory discovered under the documentation root. The directory
/// name is the rule identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuleDir {
    pub id: String,
    pub path: PathBuf,
}

/// Check that a name identifies a rule: "R" followed by at least one digit,
/// anything after that.
fn is_rule_name(name: &str) -> bool {
    let mut chars = name.chars();
    if chars.next() != Some('R') {
        return false;
    }
    matches!(chars.next(), Some(c) if c.is_ascii_digit())
}

/// List rule directories directly under `root`, sorted by name.
pub fn scan_rule_dirs(root: &Path) -> Result<Vec<RuleDir>, FatalError> {
    let entries = fs::read_dir(root).map_err(|e| FatalError::DirectoryRead {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut rules: Vec<RuleDir> = entries
        .filter_map(|entry| {
            let entry = entry.ok()?;
            if !entry.file_type().ok()?.is_dir() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            is_rule_name(&name).then(|| RuleDir {
                id: name,
                path: entry.path(),
            })
        })
        .collect();
    rules.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(rules)
}

/// Path of a rule's documentation file.
pub fn doc_path(rule_dir: &Path) -> PathBuf {
    rule_dir.join(DOC_FILE)
}

/// Read a rule's documentation file. A missing README is a per-rule skip,
/// not a fatal error, so this stays a string error.
pub fn read_rule_doc(rule_dir: &Path) -> Result<String, String> {
    fs::read_to_string(doc_path(rule_dir)).map_err(|e| e.to_string())
}

// --- Write-back ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WriteOutcome {
    Updated,
    Unchanged,
}

/// Overwrite `path` with `candidate` when it is non-empty and differs from
/// `previous`; otherwise leave the file untouched. The overwrite is a full
/// replacement through a temp file + rename so a reader never sees a
/// half-written document.
pub fn write_doc_if_changed(
    path: &Path,
    previous: &str,
    candidate: &str,
) -> Result<WriteOutcome, String> {
    if candidate.is_empty() || candidate == previous {
        return Ok(WriteOutcome::Unchanged);
    }

    let dir = path
        .parent()
        .ok_or_else(|| format!("no parent directory for {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| format!("no file name in {}", path.display()))?;

    let tmp = dir.join(format!(".{}.tmp", name));
    fs::write(&tmp, candidate).map_err(|e| e.to_string())?;
    fs::rename(&tmp, path).map_err(|e| e.to_string())?;
    Ok(WriteOutcome::Updated)
}

// --- Settings ---

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub provider: String,
    pub api_key: String,
    pub model: String,
    /// Path to the checked-out lint engine whose rules are documented.
    pub engine_path: String,
    /// Aggregate rules file, relative to `engine_path`.
    pub rules_file: String,
}

/// Resolve the global settings directory (~/.ruledoc/).
pub fn settings_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ruledoc")
}

fn settings_path() -> PathBuf {
    settings_dir().join("settings.json")
}

fn settings_from_file(path: &Path) -> Settings {
    if !path.exists() {
        return Settings::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

/// Environment variables override the settings file.
fn apply_env(settings: &mut Settings) {
    if let Ok(v) = env::var("RULEDOC_PROVIDER") {
        settings.provider = v;
    }
    if let Ok(v) = env::var("RULEDOC_MODEL") {
        settings.model = v;
    }
    if let Ok(v) = env::var("RULEDOC_API_KEY") {
        settings.api_key = v;
    }
    if let Ok(v) = env::var("RULEDOC_ENGINE_PATH") {
        settings.engine_path = v;
    }
    if let Ok(v) = env::var("RULEDOC_RULES_FILE") {
        settings.rules_file = v;
    }
}

fn apply_defaults(settings: &mut Settings) {
    if settings.provider.is_empty() {
        settings.provider = "openai".to_string();
    }
    if settings.model.is_empty() {
        settings.model = "gpt-4o".to_string();
    }
    if settings.rules_file.is_empty() {
        settings.rules_file = DEFAULT_RULES_FILE.to_string();
    }
}

/// Settings file merged with RULEDOC_* overrides, defaults filled last.
pub fn load_settings() -> Settings {
    let mut settings = settings_from_file(&settings_path());
    apply_env(&mut settings);
    apply_defaults(&mut settings);
    settings
}

pub fn configured(settings: &Settings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

/// Startup gate: the engine checkout and generation credentials must be in
/// place before any rule is touched.
pub fn validate_settings(settings: &Settings) -> Result<(), FatalError> {
    if settings.engine_path.is_empty() {
        return Err(FatalError::MissingConfig(
            "engine checkout path (set RULEDOC_ENGINE_PATH)".to_string(),
        ));
    }
    if !configured(settings) {
        return Err(FatalError::MissingConfig(
            "generation credentials (set RULEDOC_API_KEY, or provider/model in ~/.ruledoc/settings.json)"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_keeps_rule_directories_only() {
        let tmp = tempfile::tempdir().unwrap();
        for dir in ["R1", "R23", "R7-legacy", "NOTES", "R", "Rx"] {
            fs::create_dir(tmp.path().join(dir)).unwrap();
        }
        // a plain file with a rule-shaped name must not count
        fs::write(tmp.path().join("R9"), "not a directory").unwrap();

        let rules = scan_rule_dirs(tmp.path()).unwrap();
        let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["R1", "R23", "R7-legacy"]);
    }

    #[test]
    fn scan_unreadable_root_is_fatal() {
        let err = scan_rule_dirs(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, FatalError::DirectoryRead { .. }));
    }

    #[test]
    fn write_back_replaces_changed_document() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DOC_FILE);
        fs::write(&path, "old desc").unwrap();

        let outcome = write_doc_if_changed(&path, "old desc", "new desc").unwrap();
        assert_eq!(outcome, WriteOutcome::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "new desc");

        // the temp file must not survive the rename
        let leftovers: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn write_back_skips_identical_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DOC_FILE);
        fs::write(&path, "same desc").unwrap();
        let before = fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = write_doc_if_changed(&path, "same desc", "same desc").unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
        assert_eq!(fs::read_to_string(&path).unwrap(), "same desc");
    }

    #[test]
    fn write_back_treats_empty_candidate_as_no_update() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(DOC_FILE);
        fs::write(&path, "old desc").unwrap();

        let outcome = write_doc_if_changed(&path, "old desc", "").unwrap();
        assert_eq!(outcome, WriteOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&path).unwrap(), "old desc");
    }

    #[test]
    fn settings_file_feeds_missing_fields_only() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("settings.json");
        fs::write(&path, r#"{ "provider": "anthropic", "apiKey": "sk-test" }"#).unwrap();

        let mut settings = settings_from_file(&path);
        assert_eq!(settings.provider, "anthropic");
        assert_eq!(settings.api_key, "sk-test");
        assert!(settings.model.is_empty());

        apply_defaults(&mut settings);
        assert_eq!(settings.provider, "anthropic");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.rules_file, DEFAULT_RULES_FILE);
    }

    #[test]
    fn env_overrides_settings_file() {
        env::set_var("RULEDOC_MODEL", "gpt-4o-mini");
        env::set_var("RULEDOC_ENGINE_PATH", "/srv/engine");

        let mut settings = Settings {
            model: "gpt-4o".to_string(),
            ..Settings::default()
        };
        apply_env(&mut settings);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.engine_path, "/srv/engine");

        env::remove_var("RULEDOC_MODEL");
        env::remove_var("RULEDOC_ENGINE_PATH");
    }

    #[test]
    fn configured_requires_key_except_for_ollama() {
        let mut settings = Settings {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            ..Settings::default()
        };
        assert!(!configured(&settings));

        settings.api_key = "sk-test".to_string();
        assert!(configured(&settings));

        settings.provider = "ollama".to_string();
        settings.api_key.clear();
        assert!(configured(&settings));
    }

    #[test]
    fn validate_settings_gates_startup() {
        let mut settings = Settings {
            provider: "openai".to_string(),
            api_key: "sk-test".to_string(),
            model: "gpt-4o".to_string(),
            ..Settings::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(FatalError::MissingConfig(_))
        ));

        settings.engine_path = "/srv/engine".to_string();
        assert!(validate_settings(&settings).is_ok());

        settings.api_key.clear();
        assert!(matches!(
            validate_settings(&settings),
            Err(FatalError::MissingConfig(_))
        ));
    }
}
