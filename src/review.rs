//! Interactive pre-persist verification.
//!
//! With `--verify`, each page's Markdown is shown before it is persisted
//! and the operator answers yes or no. Anything other than `y`/`yes`
//! declines that page only; its children are still attempted.

use std::io::{self, BufRead, Write};

const RULER_WIDTH: usize = 50;

pub fn confirm_page(source: &str, markdown: &str) -> bool {
    let ruler = "=".repeat(RULER_WIDTH);
    println!("markdown content for: {}", source);
    println!("{}", ruler);
    println!("{}", markdown);
    println!("{}", ruler);
    print!("do you want to proceed with this document? (y/n): ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    is_affirmative(&answer)
}

fn is_affirmative(answer: &str) -> bool {
    matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    )
}
