//! Natural-language list joining for error messages.

/// Join items with "and": `a`, `a and b`, `a, b, and c`.
pub fn conjunction<S: AsRef<str>>(items: &[S]) -> String {
    join(items, "and")
}

/// Join items with "or": `a`, `a or b`, `a, b, or c`.
pub fn disjunction<S: AsRef<str>>(items: &[S]) -> String {
    join(items, "or")
}

fn join<S: AsRef<str>>(items: &[S], word: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{} {} {}", first.as_ref(), word, second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, {} {}", head.join(", "), word, last.as_ref())
        }
    }
}
