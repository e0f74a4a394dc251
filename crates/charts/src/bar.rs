use crate::svg::{self, AXIS_COLOR, GAIN_COLOR, LOSS_COLOR, TITLE_HEIGHT, WIDTH};
use analyzer::RankingTable;

const ROW_HEIGHT: f64 = 22.0;
const LABEL_WIDTH: f64 = 130.0;
const VALUE_WIDTH: f64 = 56.0;
const BOTTOM_PAD: f64 = 12.0;

/// Horizontal bar chart of composite scores, best fund on top.
///
/// The axis always includes zero; negative scores extend to its left.
pub fn bar_rank(table: &RankingTable, title: &str) -> String {
    if table.entries.is_empty() {
        return format!("{}{}", svg::header(TITLE_HEIGHT, title), svg::footer());
    }

    let height = TITLE_HEIGHT + table.entries.len() as f64 * ROW_HEIGHT + BOTTOM_PAD;
    let plot_left = LABEL_WIDTH;
    let plot_width = WIDTH - LABEL_WIDTH - VALUE_WIDTH;

    let scores: Vec<f64> = table
        .entries
        .iter()
        .map(|e| e.score)
        .filter(|s| s.is_finite())
        .collect();
    let min_v = scores.iter().copied().fold(0.0_f64, f64::min);
    let max_v = scores.iter().copied().fold(0.0_f64, f64::max);
    let span = if max_v > min_v { max_v - min_v } else { 1.0 };
    let x_of = |v: f64| plot_left + (v - min_v) / span * plot_width;
    let zero = x_of(0.0);

    let mut out = svg::header(height, title);

    for (i, entry) in table.entries.iter().enumerate() {
        let top = TITLE_HEIGHT + i as f64 * ROW_HEIGHT;
        let text_y = top + ROW_HEIGHT / 2.0 + 4.0;

        out.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{rank}. {fund}</text>"#,
            x = plot_left - 6.0,
            y = text_y,
            rank = entry.rank,
            fund = svg::escape(&entry.fund)
        ));

        if !entry.score.is_finite() {
            continue;
        }
        let end = x_of(entry.score);
        let (left, right) = if end < zero { (end, zero) } else { (zero, end) };
        let color = if entry.score >= 0.0 { GAIN_COLOR } else { LOSS_COLOR };
        out.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" />"#,
            x = left,
            y = top + 3.0,
            w = right - left,
            h = ROW_HEIGHT - 6.0,
            fill = svg::blend(color, 1.0)
        ));
        out.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}">{score:.3}</text>"#,
            x = right + 4.0,
            y = text_y,
            score = entry.score
        ));
    }

    out.push_str(&format!(
        r#"<line x1="{x:.2}" y1="{y1:.2}" x2="{x:.2}" y2="{y2:.2}" stroke="{AXIS_COLOR}" stroke-width="1" />"#,
        x = zero,
        y1 = TITLE_HEIGHT,
        y2 = height - BOTTOM_PAD
    ));

    out.push_str(svg::footer());
    out
}
