// Colored terminal output for neighbor rankings and projections.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use colored::Colorize;

use crate::dataset::Record;
use crate::projection::ProjectionResult;
use crate::similarity::Neighbor;

/// Display the ranked neighbors of one record.
pub fn display_neighbors(records: &[Record], query: usize, neighbors: &[Neighbor]) {
    let q = &records[query];
    println!(
        "\n{}",
        format!("=== Most similar to \"{}\" (id {}) ===", q.title, q.id).bold()
    );
    println!("  {}", super::clip_text(&q.text, 140).dimmed());
    println!();

    if neighbors.is_empty() {
        println!("  No neighbors requested.");
        return;
    }

    println!(
        "  {:>4}  {:<40} {:>7}  {:>6}",
        "Rank".dimmed(),
        "Title".dimmed(),
        "Score".dimmed(),
        "Rating".dimmed(),
    );
    println!("  {}", "-".repeat(64).dimmed());

    for (rank, n) in neighbors.iter().enumerate() {
        let r = &records[n.index];
        let rating = r
            .rating
            .map(|v| format!("{v:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:>4}. {:<40} {}  {:>6}",
            rank + 1,
            super::clip_text(&r.title, 37),
            colorize_score(n.score),
            rating,
        );
        println!("        {}", super::clip_text(&r.text, 100).dimmed());
    }
    println!();
}

/// Display explained variance per component.
pub fn display_projection_summary(projection: &ProjectionResult) {
    println!(
        "\n{}",
        format!(
            "=== Principal components ({} of {} dims) ===",
            projection.n_components(),
            projection.components().ncols()
        )
        .bold()
    );
    println!();

    let bar_width: usize = 30;
    let mut cumulative = 0.0;

    for (i, (&ratio, &sigma)) in projection
        .explained_variance_ratio()
        .iter()
        .zip(projection.singular_values())
        .enumerate()
    {
        cumulative += ratio;
        let filled = (ratio * bar_width as f64).round() as usize;
        let bar = format!(
            "[{}{}]",
            "=".repeat(filled.min(bar_width)),
            " ".repeat(bar_width.saturating_sub(filled))
        );
        println!(
            "  PC{:<3} {} {:>6.2}%  (cumulative {:>6.2}%, σ = {:.3})",
            i + 1,
            bar.bright_blue(),
            ratio * 100.0,
            cumulative * 100.0,
            sigma
        );
    }
    println!();
}

/// Color a cosine score: near-duplicates stand out, opposites are dimmed.
fn colorize_score(score: f64) -> colored::ColoredString {
    let s = format!("{score:>7.4}");
    if score >= 0.9 {
        s.bright_green().bold()
    } else if score >= 0.8 {
        s.green()
    } else if score >= 0.0 {
        s.normal()
    } else {
        s.dimmed()
    }
}
