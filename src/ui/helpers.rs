use anyhow::Error;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};

use crate::stats::Rank;

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &Error) -> String {
    err.chain()
        .last()
        .map(|cause| cause.to_string())
        .unwrap_or_else(|| err.to_string())
}

/// Color for a rank band, shared by the GPA column and the stats view so the
/// table and the distribution legend agree.
pub(crate) fn rank_color(rank: Rank) -> Color {
    match rank {
        Rank::Excellent => Color::Green,
        Rank::Good => Color::Blue,
        Rank::Fair => Color::Yellow,
        Rank::Weak => Color::Red,
    }
}

/// Style applied to a GPA cell in the roster table.
pub(crate) fn gpa_style(gpa: f64) -> Style {
    Style::default().fg(rank_color(Rank::for_gpa(gpa)))
}

/// Render a textual gauge bar: a filled segment proportional to
/// `value / max`, padded to `width`. This is the terminal stand-in for the
/// original's bar chart.
pub(crate) fn gauge_bar(value: f64, max: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width);
    let mut bar = "█".repeat(filled);
    bar.push_str(&"░".repeat(width - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::gauge_bar;

    #[test]
    fn gauge_bar_fills_proportionally() {
        assert_eq!(gauge_bar(2.0, 4.0, 8), "████░░░░");
        assert_eq!(gauge_bar(4.0, 4.0, 4), "████");
        assert_eq!(gauge_bar(0.0, 4.0, 4), "░░░░");
    }

    #[test]
    fn gauge_bar_handles_degenerate_inputs() {
        assert_eq!(gauge_bar(1.0, 0.0, 4), "░░░░");
        assert_eq!(gauge_bar(9.0, 4.0, 4), "████");
        assert_eq!(gauge_bar(1.0, 4.0, 0), "");
    }
}
