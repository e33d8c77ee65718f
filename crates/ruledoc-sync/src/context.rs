use std::fs;
use std::path::Path;

use regex::Regex;

use ruledoc_core::{FatalError, Settings};

/// Read the aggregate rules file under the engine checkout. Loaded once per
/// run; every rule's context is carved out of this one blob.
pub fn load_rules_source(settings: &Settings) -> Result<String, FatalError> {
    let path = Path::new(&settings.engine_path).join(&settings.rules_file);
    fs::read_to_string(&path).map_err(|e| FatalError::SourceNotFound {
        path,
        reason: e.to_string(),
    })
}

/// How much of the aggregate source to hand to the generator for one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStrategy {
    /// The entire aggregate file. Locating the rule inside it is left to
    /// the generator's own text search.
    WholeFile,
    /// The registration call quoting the rule identifier, plus trailing
    /// lines up to the next blank line. Falls back to the whole file when
    /// the pattern finds nothing.
    RuleSpan,
}

impl ContextStrategy {
    pub fn extract<'a>(self, source: &'a str, rule_id: &str) -> &'a str {
        match self {
            ContextStrategy::WholeFile => source,
            ContextStrategy::RuleSpan => rule_span(source, rule_id).unwrap_or(source),
        }
    }
}

/// Locate a registration call shape (registerRule/defineRule/addRule with
/// the quoted identifier) and return from the start of that line to the
/// next blank line.
fn rule_span<'a>(source: &'a str, rule_id: &str) -> Option<&'a str> {
    let pattern = format!(
        r#"(?:register|define|add)Rule\s*\(\s*["']{}["']"#,
        regex::escape(rule_id)
    );
    let re = Regex::new(&pattern).ok()?;
    let m = re.find(source)?;

    let start = source[..m.start()].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let end = source[m.end()..]
        .find("\n\n")
        .map(|i| m.end() + i)
        .unwrap_or(source.len());
    Some(&source[start..end])
}
