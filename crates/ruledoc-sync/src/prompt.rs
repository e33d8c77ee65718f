/// Upper bound on implementation context embedded in one request.
/// Aggregate rule files can run long; past this the tail is cut.
const MAX_CONTEXT_CHARS: usize = 60_000;

pub fn system_prompt() -> String {
    "You are an expert technical writer maintaining the rule documentation of a workflow linter.\n\
You will receive one rule's identifier, the linter source believed to contain its \
implementation, and the rule's current README.\n\n\
Instructions:\n\
1. Locate the rule's logic in the provided source. The registration call quoting the rule \
identifier is the anchor.\n\
2. Compare the README against that logic. Correct anything inaccurate and add edge cases \
the README misses.\n\
3. Keep mermaid code blocks as they are. Only change one if it contradicts the logic or \
its syntax is broken.\n\
4. Fix grammar and spelling mistakes, and improve clarity and structure.\n\
5. Ensure the document explains \"Why it matters\" and \"How to fix\".\n\
6. Return ONLY the updated Markdown content, with no commentary and no surrounding code fences."
        .to_string()
}

pub fn user_message(rule_id: &str, context: &str, current_doc: &str) -> String {
    let context = clip(context, MAX_CONTEXT_CHARS);
    format!(
        "Rule: {rule_id}\n\n\
Linter source:\n\"\"\"\n{context}\n\"\"\"\n\n\
Current README.md content:\n\"\"\"\n{current_doc}\n\"\"\"\n"
    )
}

/// Cut `text` to at most `max` characters, marking the cut.
fn clip(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n... (truncated)", &text[..idx]),
        None => text.to_string(),
    }
}
