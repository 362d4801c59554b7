const MONITOR_DOCS: &str = include_str!("../docs/monitor-api.md");

// The crate docs are compiled as doctests, so every block that is not Rust
// has to name its language.
#[test]
fn crate_doc_code_blocks_declare_a_language() {
    let fences: Vec<&str> = MONITOR_DOCS
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("```"))
        .collect();
    assert_eq!(fences.len() % 2, 0, "unbalanced code fences");
    for opening in fences.iter().step_by(2) {
        assert_ne!(*opening, "```", "untagged code block in monitor docs");
    }
}
