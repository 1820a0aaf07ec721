//! Console formatting for CLI reports

use crate::pipeline::{EvaluationResult, SideTally, TrainingReport};

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

/// Format a count together with its share, e.g. `1,234 (61.7%)`
pub fn format_share(count: usize, rate: f64) -> String {
    format!("{} ({:.1}%)", format_number(count), rate * 100.0)
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

fn side_line(tally: &SideTally) -> String {
    format!(
        "{} games, W {} D {} L {}",
        format_number(tally.games),
        format_number(tally.wins),
        format_number(tally.draws),
        format_number(tally.losses)
    )
}

/// Print an evaluation block under `title`
pub fn print_evaluation(title: &str, result: &EvaluationResult) {
    print_subsection(title);
    print_kv("Opponent", &result.opponent);
    print_kv("Games", &format_number(result.games));
    print_kv("Wins", &format_share(result.wins, result.win_rate));
    print_kv("Draws", &format_share(result.draws, result.draw_rate));
    print_kv("Losses", &format_share(result.losses, result.loss_rate));
    if result.forfeits > 0 {
        print_kv("Forfeits", &format_number(result.forfeits));
    }
    print_kv("Learner first", &side_line(&result.learner_first));
    print_kv("Learner second", &side_line(&result.learner_second));
}

/// Print the outcome of a training run
pub fn print_training_report(report: &TrainingReport) {
    print_subsection("Training");
    print_kv("Episodes", &format_number(report.episodes));
    if report.aborted > 0 {
        print_kv("Aborted", &format_number(report.aborted));
    }
    print_kv("Wins", &format_share(report.wins, report.win_rate));
    print_kv("Draws", &format_share(report.draws, report.draw_rate));
    print_kv("Losses", &format_share(report.losses, report.loss_rate));
    print_kv("Final epsilon", &format!("{:.4}", report.final_epsilon));
    print_kv("Visited states", &format_number(report.visited_states));
    print_kv("Elapsed", &format!("{:.1}s", report.elapsed_secs));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_share() {
        assert_eq!(format_share(1500, 0.75), "1,500 (75.0%)");
        assert_eq!(format_share(0, 0.0), "0 (0.0%)");
    }
}
