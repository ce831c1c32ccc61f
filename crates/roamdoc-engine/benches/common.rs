// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_outline(sections: usize) -> String {
    let base = "** Section\n\nParagraph with *bold* and /italic/ text and a [[target][link]].\n\n\
- Bullet point\n  - Nested item\n- Another item\n\n| a | b |\n|---+---|\n| 1 | 2 |\n\n\
#+BEGIN_SRC rust\nfn example() {}\n#+END_SRC\n\n";
    let mut content = String::from("#+title: Bench\n<<target>> intro\n");
    for i in 0..sections {
        content.push_str(&format!("* Part {i}\n"));
        content.push_str(base);
    }
    content
}

#[allow(dead_code)]
pub fn generate_deep_list(items: usize, depth: usize) -> String {
    let mut content = String::new();
    for i in 0..items {
        let indent = "  ".repeat(i % depth);
        content.push_str(&format!("{indent}- item {i}\n"));
    }
    content
}
