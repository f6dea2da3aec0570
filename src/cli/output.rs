//! Output formatting helpers for CLI commands

use anyhow::{Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};

use crate::tictactoe::BoardState;

/// Create a spinner for long precomputations
pub fn create_spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .map_err(|e| anyhow!("invalid spinner template: {e}"))?,
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Format a count and its share of a total, e.g. `912 (91.2%)`
pub fn format_share(count: usize, rate: f64) -> String {
    format!("{} ({:.1}%)", format_number(count), rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print a board with an optional highlighted cell, indented to match [`print_kv`]
pub fn print_board(board: &BoardState, highlight: Option<usize>) {
    for row in 0..3 {
        let line: Vec<String> = (0..3)
            .map(|col| {
                let pos = row * 3 + col;
                match (highlight, board.get(pos).to_char()) {
                    (Some(h), '.') if h == pos => "*".to_string(),
                    (_, c) => c.to_string(),
                }
            })
            .collect();
        println!("  {}", line.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(50_000), "50,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn share_is_a_percentage() {
        assert_eq!(format_share(912, 0.912), "912 (91.2%)");
    }
}
