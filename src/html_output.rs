//! HTML chart of the ranked unresolved syscalls
//!
//! Renders a self-contained page: an inline SVG grouped bar chart with a
//! log-scaled count axis, followed by the per-file coverage summary and the
//! dense count table.

use crate::pipeline::RunReport;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const PLOT_WIDTH_PER_GROUP: f64 = 90.0;
const PLOT_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_TOP: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 110.0;
const LEGEND_WIDTH: f64 = 160.0;

/// Lowest value on the log axis, so a count of 1 still gets a visible bar
const AXIS_FLOOR: f64 = 0.5;

const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// HTML chart formatter
#[derive(Debug)]
pub struct HtmlChartOutput<'a> {
    report: &'a RunReport,
}

impl<'a> HtmlChartOutput<'a> {
    pub fn new(report: &'a RunReport) -> Self {
        Self { report }
    }

    /// Escape HTML special characters to prevent XSS
    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        svg {
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
        }
        .axis {
            stroke: #444;
        }
        .grid {
            stroke: #e5e5e5;
        }
        .tick, .legend, .category {
            font-size: 12px;
            fill: #444;
        }
        table {
            border-collapse: collapse;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin: 20px 0;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 6px 10px;
            text-align: right;
        }
        th {
            background-color: #4a90d9;
            color: white;
        }
        td.syscall {
            text-align: left;
            font-family: monospace;
            color: #0066cc;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    /// Number of powers of ten spanned by the count axis
    fn decades(max_count: u64) -> u32 {
        let mut decades = 1;
        while 10u64.checked_pow(decades).is_some_and(|top| top < max_count) {
            decades += 1;
        }
        decades
    }

    /// Bar height for a count on a log axis from `AXIS_FLOOR` to 10^decades
    fn bar_height(count: u64, decades: u32) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let floor = AXIS_FLOOR.log10();
        let span = f64::from(decades) - floor;
        ((count as f64).log10() - floor) / span * PLOT_HEIGHT
    }

    /// Vertical position of 10^exponent
    fn tick_y(exponent: u32, decades: u32) -> f64 {
        let floor = AXIS_FLOOR.log10();
        let span = f64::from(decades) - floor;
        MARGIN_TOP + PLOT_HEIGHT - (f64::from(exponent) - floor) / span * PLOT_HEIGHT
    }

    /// Render the grouped bar chart as inline SVG
    pub fn render_svg(&self) -> String {
        let table = &self.report.table;
        let labels = &self.report.program_labels;
        let programs = labels.len().max(1);

        let max_count = table
            .rows
            .iter()
            .flat_map(|row| row.counts.iter().copied())
            .max()
            .unwrap_or(1);
        let decades = Self::decades(max_count);

        let groups = table.rows.len().max(1);
        let plot_width = groups as f64 * PLOT_WIDTH_PER_GROUP;
        let width = MARGIN_LEFT + plot_width + LEGEND_WIDTH;
        let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + PLOT_HEIGHT;
        let bar_width = (PLOT_WIDTH_PER_GROUP - 20.0) / programs as f64;

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}">"#
        );

        // Grid lines and tick labels at every power of ten
        for exponent in 0..=decades {
            let y = Self::tick_y(exponent, decades);
            let _ = writeln!(
                svg,
                r#"  <line class="grid" x1="{MARGIN_LEFT:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}"/>"#,
                MARGIN_LEFT + plot_width
            );
            let _ = writeln!(
                svg,
                r#"  <text class="tick" x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
                MARGIN_LEFT - 6.0,
                y + 4.0,
                10u128.pow(exponent)
            );
        }

        for (group, row) in table.rows.iter().enumerate() {
            let group_x = MARGIN_LEFT + group as f64 * PLOT_WIDTH_PER_GROUP + 10.0;
            for (column, count) in row.counts.iter().enumerate() {
                let bar = Self::bar_height(*count, decades);
                let _ = writeln!(
                    svg,
                    r#"  <rect x="{:.1}" y="{:.1}" width="{bar_width:.1}" height="{bar:.1}" fill="{}"><title>{}: {}</title></rect>"#,
                    group_x + column as f64 * bar_width,
                    baseline - bar,
                    PALETTE[column % PALETTE.len()],
                    Self::escape_html(labels.get(column).map_or("", String::as_str)),
                    count
                );
            }

            let label_x = group_x + (PLOT_WIDTH_PER_GROUP - 20.0) / 2.0;
            let label_y = baseline + 14.0;
            let _ = writeln!(
                svg,
                r#"  <text class="category" x="{label_x:.1}" y="{label_y:.1}" text-anchor="end" transform="rotate(-40 {label_x:.1} {label_y:.1})">{}</text>"#,
                Self::escape_html(&row.label())
            );
        }

        let _ = writeln!(
            svg,
            r#"  <line class="axis" x1="{MARGIN_LEFT:.1}" y1="{MARGIN_TOP:.1}" x2="{MARGIN_LEFT:.1}" y2="{baseline:.1}"/>"#
        );
        let _ = writeln!(
            svg,
            r#"  <line class="axis" x1="{MARGIN_LEFT:.1}" y1="{baseline:.1}" x2="{:.1}" y2="{baseline:.1}"/>"#,
            MARGIN_LEFT + plot_width
        );

        let legend_x = MARGIN_LEFT + plot_width + 20.0;
        for (column, label) in labels.iter().enumerate() {
            let y = MARGIN_TOP + 10.0 + column as f64 * 20.0;
            let _ = writeln!(
                svg,
                r#"  <rect x="{legend_x:.1}" y="{:.1}" width="12" height="12" fill="{}"/>"#,
                y - 10.0,
                PALETTE[column % PALETTE.len()]
            );
            let _ = writeln!(
                svg,
                r#"  <text class="legend" x="{:.1}" y="{y:.1}">{}</text>"#,
                legend_x + 18.0,
                Self::escape_html(label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }

    fn render_coverage_table(&self) -> String {
        let mut html = String::new();
        html.push_str("    <h2>Coverage</h2>\n");
        html.push_str("    <table>\n");
        html.push_str("        <tr><th>File</th><th>Coverage %</th><th>Total</th><th>Unique coverage %</th><th>Unique total</th></tr>\n");

        for file in &self.report.files {
            let (coverage, total, unique, unique_total) = match &file.coverage {
                Some(s) => (
                    format!("{:.2}", s.coverage_percent),
                    s.total,
                    format!("{:.2}", s.unique_coverage_percent),
                    s.unique_total,
                ),
                None => ("N/A".to_string(), 0, "N/A".to_string(), 0),
            };
            let _ = writeln!(
                html,
                r#"        <tr><td class="syscall">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
                Self::escape_html(&file.path.display().to_string()),
                coverage,
                total,
                unique,
                unique_total
            );
        }

        html.push_str("    </table>\n");
        html
    }

    fn render_count_table(&self) -> String {
        let mut html = String::new();
        html.push_str("    <h2>Unresolved Syscall Counts</h2>\n");
        html.push_str("    <table>\n");
        html.push_str("        <tr><th>Syscall</th>");
        for label in &self.report.program_labels {
            let _ = write!(html, "<th>{}</th>", Self::escape_html(label));
        }
        html.push_str("<th>Total</th></tr>\n");

        for row in &self.report.table.rows {
            let _ = write!(
                html,
                r#"        <tr><td class="syscall">{}</td>"#,
                Self::escape_html(&row.label())
            );
            for count in &row.counts {
                let _ = write!(html, "<td>{}</td>", count);
            }
            let _ = writeln!(html, "<td>{}</td></tr>", row.total());
        }

        html.push_str("    </table>\n");
        html
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Unresolved Syscalls</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        let _ = writeln!(
            html,
            "    <h1>Top {} Unresolved Syscalls</h1>",
            self.report.table.len()
        );
        html.push_str(&self.render_svg());
        html.push_str(&self.render_count_table());
        html.push_str(&self.render_coverage_table());

        html.push_str("    <div class=\"footer\">\n");
        html.push_str("        Generated by syscov - Syscall Coverage Statistics\n");
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }

    /// Write the page to a file
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.to_html())
            .with_context(|| format!("Failed to write chart: {}", path.as_ref().display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FileReport;
    use crate::rank::{RankedRow, RankedTable};
    use std::path::PathBuf;

    fn report() -> RunReport {
        RunReport {
            files: vec![FileReport {
                path: PathBuf::from("<a>.json"),
                program: "<a>".to_string(),
                coverage: None,
            }],
            program_labels: vec!["<A>".to_string(), "B".to_string()],
            table: RankedTable {
                programs: vec!["<a>".to_string(), "b".to_string()],
                rows: vec![
                    RankedRow {
                        id: 302,
                        name: Some("prlimit64".to_string()),
                        counts: vec![1500, 0],
                    },
                    RankedRow {
                        id: 999,
                        name: None,
                        counts: vec![1, 10],
                    },
                ],
            },
            distinct_unresolved: 2,
        }
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(HtmlChartOutput::escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(HtmlChartOutput::escape_html("a&b"), "a&amp;b");
        assert_eq!(HtmlChartOutput::escape_html("\"test\""), "&quot;test&quot;");
        assert_eq!(HtmlChartOutput::escape_html("'test'"), "&#39;test&#39;");
    }

    #[test]
    fn test_decades() {
        assert_eq!(HtmlChartOutput::decades(0), 1);
        assert_eq!(HtmlChartOutput::decades(1), 1);
        assert_eq!(HtmlChartOutput::decades(10), 1);
        assert_eq!(HtmlChartOutput::decades(11), 2);
        assert_eq!(HtmlChartOutput::decades(1500), 4);
        assert_eq!(HtmlChartOutput::decades(u64::MAX), 20);
    }

    #[test]
    fn test_bar_height_is_logarithmic() {
        assert_eq!(HtmlChartOutput::bar_height(0, 3), 0.0);
        let one = HtmlChartOutput::bar_height(1, 3);
        let ten = HtmlChartOutput::bar_height(10, 3);
        let hundred = HtmlChartOutput::bar_height(100, 3);
        assert!(one > 0.0);
        assert!((hundred - ten - (ten - one)).abs() < 1e-9);
        assert!((HtmlChartOutput::bar_height(1000, 3) - PLOT_HEIGHT).abs() < 1e-9);
    }

    #[test]
    fn test_svg_has_bar_per_program_per_row() {
        let report = report();
        let svg = HtmlChartOutput::new(&report).render_svg();
        // 4 bars plus 2 legend swatches
        assert_eq!(svg.matches("<rect").count(), 6);
        assert!(svg.contains(">prlimit64</text>"));
        assert!(svg.contains(">999</text>"));
        assert!(svg.contains(">10000</text>"));
    }

    #[test]
    fn test_html_document_escapes_labels() {
        let report = report();
        let html = HtmlChartOutput::new(&report).to_html();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("&lt;A&gt;"));
        assert!(!html.contains("<A>"));
        assert!(html.contains("<h1>Top 2 Unresolved Syscalls</h1>"));
        assert!(html.contains("<td>N/A</td>"));
    }

    #[test]
    fn test_empty_table_renders() {
        let mut report = report();
        report.table.rows.clear();
        let html = HtmlChartOutput::new(&report).to_html();
        assert!(html.contains("</svg>"));
    }
}
