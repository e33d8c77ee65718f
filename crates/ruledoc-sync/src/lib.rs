pub mod context;
pub mod engine;
pub mod normalize;
mod prompt;

use std::path::Path;

use serde::{Deserialize, Serialize};

use ruledoc_core::{FatalError, Settings, WriteOutcome};

use crate::context::ContextStrategy;
use crate::engine::TextGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Updated,
    Unchanged,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleOutcome {
    pub rule_id: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    pub results: Vec<RuleOutcome>,
}

impl SyncSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    fn push(&mut self, rule_id: &str, outcome: Outcome, detail: Option<String>) {
        self.results.push(RuleOutcome {
            rule_id: rule_id.to_string(),
            outcome,
            detail,
        });
    }
}

/// Audit every rule directory under `root` against the engine source and
/// rewrite out-of-date READMEs. Rules are processed one at a time, each
/// cycle completing before the next begins. Per-rule failures are logged
/// and skipped; only an unreadable root or a missing engine source aborts
/// the run.
pub async fn run_sync(
    root: &Path,
    settings: &Settings,
    strategy: ContextStrategy,
    generator: &dyn TextGenerator,
) -> Result<SyncSummary, FatalError> {
    eprintln!("[ruledoc] scanning rule directories...");
    let rules = ruledoc_core::scan_rule_dirs(root)?;
    let ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    eprintln!("[ruledoc] found {} rules: {}", rules.len(), ids.join(", "));

    let source = context::load_rules_source(settings)?;
    let system = prompt::system_prompt();

    let mut summary = SyncSummary::default();

    for rule in &rules {
        let doc = match ruledoc_core::read_rule_doc(&rule.path) {
            Ok(doc) => doc,
            Err(e) => {
                eprintln!("[ruledoc] skipping {}: README not readable ({e})", rule.id);
                summary.push(
                    &rule.id,
                    Outcome::Skipped,
                    Some(format!("README not readable: {e}")),
                );
                continue;
            }
        };

        eprintln!("[ruledoc] auditing {}...", rule.id);

        let ctx = strategy.extract(&source, &rule.id);
        let user_msg = prompt::user_message(&rule.id, ctx, &doc);

        let raw = match generator.generate(&system, &user_msg).await {
            Ok(raw) => raw,
            Err(e) => {
                eprintln!("[ruledoc] skipping {}: generation failed ({e})", rule.id);
                summary.push(
                    &rule.id,
                    Outcome::Skipped,
                    Some(format!("generation failed: {e}")),
                );
                continue;
            }
        };

        let candidate = normalize::strip_fences(&raw);

        let path = ruledoc_core::doc_path(&rule.path);
        match ruledoc_core::write_doc_if_changed(&path, &doc, &candidate) {
            Ok(WriteOutcome::Updated) => {
                eprintln!("[ruledoc] updated {}/{}", rule.id, ruledoc_core::DOC_FILE);
                summary.push(&rule.id, Outcome::Updated, None);
            }
            Ok(WriteOutcome::Unchanged) => {
                eprintln!("[ruledoc] no changes needed for {}", rule.id);
                summary.push(&rule.id, Outcome::Unchanged, None);
            }
            Err(e) => {
                eprintln!("[ruledoc] skipping {}: write failed ({e})", rule.id);
                summary.push(
                    &rule.id,
                    Outcome::Skipped,
                    Some(format!("write failed: {e}")),
                );
            }
        }
    }

    Ok(summary)
}
