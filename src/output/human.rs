//! Styled progress lines for interactive runs. Everything except `error`
//! goes to stdout so it interleaves with the command's own output.

use std::fmt::Display;

use console::{style, StyledObject};

const RULE_WIDTH: usize = 70;

/// `<mark> <msg>`, the shape every status line shares.
fn line(mark: impl Display, msg: &str) -> String {
    format!("{mark} {msg}")
}

fn rule() -> StyledObject<String> {
    style("-".repeat(RULE_WIDTH)).dim()
}

pub fn success(msg: &str) {
    println!("{}", line(style("✓").green().bold(), msg));
}

pub fn info(msg: &str) {
    println!("{}", line(style("ℹ").blue().bold(), msg));
}

pub fn warning(msg: &str) {
    println!("{}", line(style("⚠").yellow().bold(), msg));
}

/// Errors go to stderr so `--json` consumers still get clean stdout.
pub fn error(msg: &str) {
    eprintln!("{}", line(style("✗").red().bold(), msg));
}

/// Section title for a run, preceded by a blank line.
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Numbered phase of a run, e.g. `[2/4] Correlating commits...`.
pub fn step(n: usize, total: usize, msg: &str) {
    println!("{}", line(style(format!("[{n}/{total}]")).cyan().bold(), msg));
}

/// Generated text framed by rules, with `title` above it.
pub fn block(title: &str, body: &str) {
    println!("{}\n{title}\n{}\n{body}\n{}", rule(), rule(), rule());
}
