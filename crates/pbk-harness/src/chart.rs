//! Chart rendering for scenario outputs.

use std::fmt::Write as _;

use pbk_core::SimulationResult;
use pbk_core::expr::TIME_SYMBOL;

pub trait ChartRenderer {
    /// File extension of the rendered chart, without the dot.
    fn extension(&self) -> &'static str;

    /// Render every non-time column of `result` against time.
    fn render(&self, title: &str, result: &SimulationResult) -> String;
}

const PALETTE: [&str; 8] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

/// Self-contained SVG line chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x: (f64, f64),
    y: (f64, f64),
}

impl Frame {
    fn point(&self, x: f64, y: f64) -> (f64, f64) {
        let fx = (x - self.x.0) / (self.x.1 - self.x.0);
        let fy = (y - self.y.0) / (self.y.1 - self.y.0);
        (self.left + fx * self.width, self.top + (1.0 - fy) * self.height)
    }
}

/// Data range widened so a flat series still gets a visible axis.
fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        (0.0, 1.0)
    } else if (hi - lo).abs() < f64::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl ChartRenderer for SvgChartRenderer {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, title: &str, result: &SimulationResult) -> String {
        let (width, height) = (f64::from(self.width), f64::from(self.height));
        let time = result.column(TIME_SYMBOL).unwrap_or_default();
        let series = result
            .columns
            .iter()
            .filter(|c| c.as_str() != TIME_SYMBOL)
            .filter_map(|c| result.column(c).map(|values| (c.as_str(), values)))
            .collect::<Vec<_>>();

        let frame = Frame {
            left: 70.0,
            top: 40.0,
            width: width - 230.0,
            height: height - 90.0,
            x: span(time.iter().copied()),
            y: span(series.iter().flat_map(|(_, v)| v.iter().copied())),
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="24" font-family="sans-serif" font-size="16" text-anchor="middle">{}</text>"#,
            frame.left + frame.width / 2.0,
            escape(title)
        );

        let (x0, y0) = (frame.left, frame.top + frame.height);
        let _ = writeln!(
            svg,
            r#"<path d="M{x0:.1} {:.1} L{x0:.1} {y0:.1} L{:.1} {y0:.1}" stroke="black" fill="none"/>"#,
            frame.top,
            frame.left + frame.width
        );
        for (value, x, y, anchor) in [
            (frame.x.0, x0, y0 + 18.0, "start"),
            (frame.x.1, x0 + frame.width, y0 + 18.0, "end"),
            (frame.y.0, x0 - 6.0, y0, "end"),
            (frame.y.1, x0 - 6.0, frame.top + 4.0, "end"),
        ] {
            let _ = writeln!(
                svg,
                r#"<text x="{x:.1}" y="{y:.1}" font-family="sans-serif" font-size="11" text-anchor="{anchor}">{value:.3}</text>"#
            );
        }
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="12" text-anchor="middle">{TIME_SYMBOL}</text>"#,
            frame.left + frame.width / 2.0,
            height - 12.0
        );

        for (n, (name, values)) in series.iter().enumerate() {
            let colour = PALETTE[n % PALETTE.len()];
            let points = time
                .iter()
                .zip(values)
                .filter(|(t, v)| t.is_finite() && v.is_finite())
                .map(|(&t, &v)| {
                    let (x, y) = frame.point(t, v);
                    format!("{x:.2},{y:.2}")
                })
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(
                svg,
                r#"<polyline points="{points}" stroke="{colour}" stroke-width="1.5" fill="none"/>"#
            );
            #[allow(clippy::cast_precision_loss)]
            let legend_y = frame.top + 16.0 * n as f64;
            let legend_x = frame.left + frame.width + 20.0;
            let _ = writeln!(
                svg,
                r#"<line x1="{legend_x:.1}" y1="{legend_y:.1}" x2="{:.1}" y2="{legend_y:.1}" stroke="{colour}" stroke-width="2"/>"#,
                legend_x + 18.0
            );
            let _ = writeln!(
                svg,
                r#"<text x="{:.1}" y="{:.1}" font-family="sans-serif" font-size="11">{}</text>"#,
                legend_x + 24.0,
                legend_y + 4.0,
                escape(name)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_one_polyline_per_series() {
        let mut result = SimulationResult::new(vec!["time".into(), "AGut".into(), "ABlood".into()]);
        result.rows = vec![vec![0.0, 1.0, 0.0], vec![1.0, 0.5, 0.4], vec![2.0, 0.25, 0.5]];

        let svg = SvgChartRenderer::default().render("bolus <1>", &result);
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">AGut</text>"));
        assert!(svg.contains("bolus &lt;1&gt;"));
    }

    #[test]
    fn empty_result_still_renders() {
        let result = SimulationResult::new(vec!["time".into()]);
        let svg = SvgChartRenderer::default().render("empty", &result);
        assert_eq!(svg.matches("<polyline").count(), 0);
    }
}
