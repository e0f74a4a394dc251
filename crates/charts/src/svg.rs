//! Shared SVG building blocks.

pub(crate) const WIDTH: f64 = 576.0;
pub(crate) const TITLE_HEIGHT: f64 = 32.0;
pub(crate) const GAIN_COLOR: (f64, f64, f64) = (79.0, 164.0, 135.0);
pub(crate) const LOSS_COLOR: (f64, f64, f64) = (175.0, 75.0, 100.0);
pub(crate) const MISSING_COLOR: &str = "#e6e6e6";
pub(crate) const AXIS_COLOR: &str = "#8c8c8c";

/// Opens a standalone SVG document and draws the title.
pub(crate) fn header(height: f64, title: &str) -> String {
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
            r#"<style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
            r##"<text x="{cx:.2}" y="20" text-anchor="middle" font-size="13" fill="#262626">{title}</text>"##
        ),
        w = WIDTH,
        h = height,
        cx = WIDTH / 2.0,
        title = escape(title)
    )
}

pub(crate) fn footer() -> &'static str {
    "</svg>"
}

/// Escapes the five XML special characters.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// `rgb(...)` blended from white towards `base` by `t` in 0.0-1.0.
pub(crate) fn blend(base: (f64, f64, f64), t: f64) -> String {
    let mix = |c: f64| 255.0 * (1.0 - t) + c * t;
    format!("rgb({:.0},{:.0},{:.0})", mix(base.0), mix(base.1), mix(base.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape(r#"A&B <"x">"#), "A&amp;B &lt;&quot;x&quot;&gt;");
        assert_eq!(escape("VCBF-BCF"), "VCBF-BCF");
    }

    #[test]
    fn blend_runs_from_white_to_base() {
        assert_eq!(blend(GAIN_COLOR, 0.0), "rgb(255,255,255)");
        assert_eq!(blend(GAIN_COLOR, 1.0), "rgb(79,164,135)");
    }
}
