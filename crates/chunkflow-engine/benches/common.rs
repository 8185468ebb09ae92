// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_paragraphs(count: usize) -> String {
    let mut text = String::new();
    for index in 0..count {
        if index > 0 {
            text.push_str("\n\n");
        }
        text.push_str(&format!(
            "Paragraph {index} opens with a claim. It continues with a supporting sentence\nthat wraps onto a second line, and closes with a short remark."
        ));
    }
    text
}
