use crate::error::ChartError;
use crate::svg::{self, GAIN_COLOR, LOSS_COLOR, MISSING_COLOR, TITLE_HEIGHT, WIDTH};
use analyzer::YearlyComparisonTable;
use std::collections::BTreeMap;

const LEFT_PAD: f64 = 110.0;
const RIGHT_PAD: f64 = 12.0;
const BOTTOM_PAD: f64 = 24.0;
const CELL_HEIGHT: f64 = 24.0;

/// Which number fills each heatmap cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeatmapValue {
    /// The fund's own calendar-year return.
    #[default]
    FundReturn,
    /// Fund return minus the named benchmark's return for the same year.
    ExcessOver(String),
}

/// One row per fund, one column per year, coloured on a diverging scale.
///
/// Colour intensity is `|value| / max|value|` across the whole grid. A year
/// with no value for a fund (no fund return, or no benchmark return in excess
/// mode) is drawn as a grey cell.
pub fn plot_yearly_heatmap(
    table: &YearlyComparisonTable,
    value: &HeatmapValue,
    title: &str,
) -> Result<String, ChartError> {
    let benchmark = match value {
        HeatmapValue::FundReturn => None,
        HeatmapValue::ExcessOver(name) => Some(
            table
                .benchmark_index(name)
                .ok_or_else(|| ChartError::UnknownBenchmark(name.clone()))?,
        ),
    };

    let funds = table.funds();
    let years = table.years();
    if funds.is_empty() || years.is_empty() {
        return Ok(format!("{}{}", svg::header(TITLE_HEIGHT, title), svg::footer()));
    }

    let cells: BTreeMap<(&str, i32), f64> = table
        .rows
        .iter()
        .filter_map(|row| {
            let v = match benchmark {
                None => Some(row.fund_return),
                Some(idx) => row
                    .benchmark_returns
                    .get(idx)
                    .copied()
                    .flatten()
                    .map(|b| row.fund_return - b),
            };
            v.filter(|v| v.is_finite()).map(|v| ((row.fund.as_str(), row.year), v))
        })
        .collect();

    let max_abs = cells.values().fold(0.0_f64, |m, v| m.max(v.abs()));
    let max_abs = if max_abs > 0.0 { max_abs } else { 1.0 };

    let cell_w = (WIDTH - LEFT_PAD - RIGHT_PAD) / years.len().max(1) as f64;
    let height = TITLE_HEIGHT + funds.len() as f64 * CELL_HEIGHT + BOTTOM_PAD;
    let mut out = svg::header(height, title);

    // Year labels along the x-axis.
    for (col, year) in years.iter().enumerate() {
        out.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" fill="#808080">{year}</text>"##,
            x = LEFT_PAD + (col as f64 + 0.5) * cell_w,
            y = height - BOTTOM_PAD + 14.0
        ));
    }

    for (row, fund) in funds.iter().enumerate() {
        let y_top = TITLE_HEIGHT + row as f64 * CELL_HEIGHT;
        let y_text = y_top + CELL_HEIGHT / 2.0 + 4.0;

        out.push_str(&format!(
            r##"<text x="{x:.2}" y="{y:.2}" text-anchor="end" fill="#808080">{fund}</text>"##,
            x = LEFT_PAD - 5.0,
            y = y_text,
            fund = svg::escape(fund)
        ));

        for (col, year) in years.iter().enumerate() {
            let x_left = LEFT_PAD + col as f64 * cell_w;

            let Some(v) = cells.get(&(*fund, *year)).copied() else {
                out.push_str(&format!(
                    r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{MISSING_COLOR}" />"#,
                    x = x_left,
                    y = y_top,
                    w = cell_w,
                    h = CELL_HEIGHT
                ));
                continue;
            };

            let t = (v.abs() / max_abs).min(1.0);
            let base = if v >= 0.0 { GAIN_COLOR } else { LOSS_COLOR };
            let text_color = if t > 0.6 { "#ffffff" } else { "#262626" };
            out.push_str(&format!(
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{fill}" />"#,
                x = x_left,
                y = y_top,
                w = cell_w,
                h = CELL_HEIGHT,
                fill = svg::blend(base, t)
            ));
            out.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="9" fill="{text_color}">{pct:.1}%</text>"#,
                x = x_left + cell_w / 2.0,
                y = y_text,
                pct = v * 100.0
            ));
        }
    }

    out.push_str(svg::footer());
    tracing::debug!(funds = funds.len(), years = years.len(), "Rendered yearly heatmap");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::YearlyRow;

    fn row(fund: &str, year: i32, fund_return: f64, bench: Option<f64>) -> YearlyRow {
        YearlyRow {
            fund: fund.to_string(),
            year,
            fund_return,
            benchmark_returns: vec![bench],
        }
    }

    fn sample() -> YearlyComparisonTable {
        YearlyComparisonTable {
            funds: vec!["DCDS".to_string(), "SSISCA".to_string()],
            benchmarks: vec!["VNINDEX".to_string()],
            rows: vec![
                row("DCDS", 2021, 0.25, Some(0.10)),
                row("DCDS", 2022, -0.20, None),
                row("SSISCA", 2022, -0.10, Some(-0.30)),
            ],
        }
    }

    #[test]
    fn own_returns_fill_every_present_cell() {
        let out = plot_yearly_heatmap(&sample(), &HeatmapValue::FundReturn, "Returns").unwrap();

        assert!(out.contains("25.0%"));
        assert!(out.contains("-20.0%"));
        assert!(out.contains("-10.0%"));
        // SSISCA has no 2021 row.
        assert_eq!(out.matches(MISSING_COLOR).count(), 1);
        // The largest magnitude gets full intensity.
        assert!(out.contains("rgb(79,164,135)"));
    }

    #[test]
    fn excess_mode_subtracts_the_benchmark() {
        let out = plot_yearly_heatmap(
            &sample(),
            &HeatmapValue::ExcessOver("vnindex".to_string()),
            "Excess",
        )
        .unwrap();

        assert!(out.contains("15.0%"));
        assert!(out.contains("20.0%"));
        // DCDS 2022 lacks a benchmark return, SSISCA 2021 lacks a row.
        assert_eq!(out.matches(MISSING_COLOR).count(), 2);
    }

    #[test]
    fn unknown_benchmark_is_an_error() {
        let err = plot_yearly_heatmap(
            &sample(),
            &HeatmapValue::ExcessOver("VN30".to_string()),
            "Excess",
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::UnknownBenchmark(name) if name == "VN30"));
    }

    #[test]
    fn fund_without_rows_is_drawn_as_missing() {
        let mut table = sample();
        table.funds.push("NEWFUND".to_string());

        let out = plot_yearly_heatmap(&table, &HeatmapValue::FundReturn, "Returns").unwrap();

        assert!(out.contains(">NEWFUND</text>"));
        assert_eq!(out.matches(MISSING_COLOR).count(), 3);
        assert_eq!(out.matches("<text").count(), 2 + 3 + 3 + 1);
        assert!(out.ends_with("</svg>"));
    }

    #[test]
    fn empty_table_renders_only_the_title() {
        let out = plot_yearly_heatmap(
            &YearlyComparisonTable::default(),
            &HeatmapValue::FundReturn,
            "Nothing & nobody",
        )
        .unwrap();
        assert!(out.contains("Nothing &amp; nobody"));
        assert!(!out.contains("<rect"));
        assert!(out.ends_with("</svg>"));
    }
}
