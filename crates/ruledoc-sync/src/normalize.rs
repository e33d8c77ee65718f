/// Strip a wrapping code fence the generator may have added despite
/// instructions. Only the very first and very last lines are touched;
/// interior content (embedded mermaid fences included) passes through
/// byte-for-byte. Absence of fences is a no-op.
pub fn strip_fences(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        match rest.find('\n') {
            // Opening fence line: backticks plus an optional language tag.
            Some(nl) if !rest[..nl].contains('`') => text = &rest[nl + 1..],
            None if !rest.contains('`') => text = "",
            _ => {}
        }
    }

    let trimmed = text.trim_end();
    if let Some(head) = trimmed.strip_suffix("```") {
        // Closing fence only counts when it sits alone on the last line.
        if head.is_empty() {
            text = "";
        } else if head.ends_with('\n') {
            text = head;
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfenced_output_passes_through() {
        assert_eq!(strip_fences("New accurate description."), "New accurate description.");
    }

    #[test]
    fn markdown_fence_is_stripped() {
        assert_eq!(
            strip_fences("```markdown\nNew accurate description.\n```"),
            "New accurate description."
        );
    }

    #[test]
    fn bare_fence_is_stripped() {
        assert_eq!(strip_fences("```\n# Title\n\nBody.\n```"), "# Title\n\nBody.");
    }

    #[test]
    fn interior_fences_survive_byte_for_byte() {
        let body = "# R1\n\n```mermaid\ngraph TD;\n  A-->B;\n```\n\nDetails.";
        let wrapped = format!("```markdown\n{body}\n```");
        assert_eq!(strip_fences(&wrapped), body);
    }

    #[test]
    fn unmatched_opening_fence_is_still_dropped() {
        assert_eq!(strip_fences("```markdown\nBody only."), "Body only.");
    }

    #[test]
    fn inline_backticks_at_the_end_are_not_a_fence() {
        assert_eq!(strip_fences("Use `wf.nodes```"), "Use `wf.nodes```");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(strip_fences("\n\n  body  \n\n"), "body");
    }

    #[test]
    fn fence_only_output_normalizes_to_empty() {
        assert_eq!(strip_fences("```markdown\n```"), "");
        assert_eq!(strip_fences("```"), "");
    }
}
