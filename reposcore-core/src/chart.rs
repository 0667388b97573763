//! Hand-rendered SVG charts.

use html_escape::encode_text;

use crate::activity::WeeklyActivity;
use crate::colors::{ChartTheme, Grade};
use crate::report::{OverallCohort, RankedCohort};

const FONT: &str = "ui-monospace,SFMono-Regular,'SF Mono',Menlo,Consolas,monospace";
const FS: u32 = 12;
const CW: f64 = 7.2;
const PAD_X: f64 = 16.0;
const PAD_TOP: f64 = 44.0;
const PAD_BOT: f64 = 36.0;
const ROW_H: f64 = 22.0;
const BAR_H: f64 = 14.0;
const PLOT_W: f64 = 480.0;

struct Svg {
    width: f64,
    height: f64,
    body: Vec<String>,
}

impl Svg {
    fn new(width: f64, height: f64, theme: &dyn ChartTheme) -> Self {
        let body = vec![format!(
            "<rect width=\"{width:.0}\" height=\"{height:.0}\" fill=\"{}\"/>",
            theme.background()
        )];
        Self { width, height, body }
    }

    fn text(&mut self, x: f64, y: f64, anchor: &str, color: &str, bold: bool, s: &str) {
        let weight = if bold { " font-weight=\"bold\"" } else { "" };
        self.body.push(format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" text-anchor=\"{anchor}\" font-family=\"{FONT}\" \
             font-size=\"{FS}px\" fill=\"{color}\"{weight}>{}</text>",
            encode_text(s)
        ));
    }

    fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        self.body.push(format!(
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" fill=\"{color}\" rx=\"1\"/>"
        ));
    }

    fn title(&mut self, title: &str, theme: &dyn ChartTheme) {
        let x = self.width / 2.0;
        self.text(x, 24.0, "middle", theme.foreground(), true, title);
    }

    fn legend(&mut self, items: &[(&str, &str)], theme: &dyn ChartTheme) {
        let y = self.height - 14.0;
        let mut x = PAD_X;
        for (label, color) in items {
            self.rect(x, y - 10.0, 10.0, 10.0, color);
            self.text(x + 14.0, y, "start", theme.foreground(), false, label);
            x += 14.0 + label.chars().count() as f64 * CW + 18.0;
        }
    }

    fn finish(self) -> String {
        let w = self.width as i32;
        let h = self.height as i32;
        let mut out = vec![format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
        )];
        out.extend(self.body);
        out.push("</svg>".to_string());
        out.join("\n") + "\n"
    }
}

fn label_width<'a, I: IntoIterator<Item = &'a str>>(names: I) -> f64 {
    let longest = names.into_iter().map(|n| n.chars().count()).max().unwrap_or(0);
    longest.max(4) as f64 * CW + 12.0
}

// ---------------------------------------------------------------------------
// Score chart
// ---------------------------------------------------------------------------

/// Horizontal PR/issue stacked bars, one row per participant.
pub fn score_chart(cohort: &RankedCohort, title: &str, theme: &dyn ChartTheme, show_grade: bool) -> String {
    let label_w = label_width(cohort.iter().map(|e| e.name.as_str()));
    let max = cohort.iter().map(|e| e.score.total).max().unwrap_or(0).max(1) as f64;
    let scale = PLOT_W / max;

    let rows = cohort.len().max(1) as f64;
    let width = PAD_X * 2.0 + label_w + PLOT_W + 90.0;
    let height = PAD_TOP + rows * ROW_H + PAD_BOT;
    let mut svg = Svg::new(width, height, theme);
    svg.title(title, theme);

    let x0 = PAD_X + label_w;
    for (i, e) in cohort.iter().enumerate() {
        let y = PAD_TOP + i as f64 * ROW_H;
        let pr_w = e.score.pr_points() as f64 * scale;
        let is_w = e.score.issue_points() as f64 * scale;

        svg.text(x0 - 8.0, y + BAR_H - 3.0, "end", theme.foreground(), false, &e.name);
        svg.rect(x0, y, pr_w, BAR_H, theme.pr_color());
        svg.rect(x0 + pr_w, y, is_w, BAR_H, theme.issue_color());

        let mut label = e.score.total.to_string();
        if show_grade {
            label.push_str(&format!(" ({})", Grade::from_total(e.score.total)));
        }
        svg.text(x0 + pr_w + is_w + 6.0, y + BAR_H - 3.0, "start", theme.muted(), false, &label);
    }

    svg.legend(&[("PR", theme.pr_color()), ("issue", theme.issue_color())], theme);
    svg.finish()
}

// ---------------------------------------------------------------------------
// Weekly chart
// ---------------------------------------------------------------------------

/// Grouped PR/issue bars per semester week.
pub fn weekly_chart(weekly: &WeeklyActivity, title: &str, theme: &dyn ChartTheme) -> String {
    const GROUP_W: f64 = 36.0;
    const PLOT_H: f64 = 200.0;

    let max = weekly.values().map(|w| w.pr.max(w.issue)).max().unwrap_or(0).max(1) as f64;
    let groups = weekly.len().max(1) as f64;
    let width = (PAD_X * 2.0 + 32.0 + groups * GROUP_W).max(240.0);
    let height = PAD_TOP + PLOT_H + 20.0 + PAD_BOT;
    let mut svg = Svg::new(width, height, theme);
    svg.title(title, theme);

    let x0 = PAD_X + 32.0;
    let base = PAD_TOP + PLOT_H;
    svg.rect(x0, base, groups * GROUP_W, 1.0, theme.muted());
    svg.text(x0 - 6.0, PAD_TOP + 4.0, "end", theme.muted(), false, &(max as u64).to_string());

    let bar_w = (GROUP_W - 8.0) / 2.0;
    for (i, (week, counts)) in weekly.iter().enumerate() {
        let gx = x0 + i as f64 * GROUP_W + 4.0;
        let pr_h = counts.pr as f64 / max * PLOT_H;
        let is_h = counts.issue as f64 / max * PLOT_H;
        svg.rect(gx, base - pr_h, bar_w, pr_h, theme.pr_color());
        svg.rect(gx + bar_w, base - is_h, bar_w, is_h, theme.issue_color());
        svg.text(gx + bar_w, base + 14.0, "middle", theme.muted(), false, &format!("W{week}"));
    }

    svg.legend(&[("PR", theme.pr_color()), ("issue", theme.issue_color())], theme);
    svg.finish()
}

// ---------------------------------------------------------------------------
// Overall chart
// ---------------------------------------------------------------------------

/// Horizontal bars stacked by repository.
pub fn overall_chart(overall: &OverallCohort, title: &str, theme: &dyn ChartTheme) -> String {
    let label_w = label_width(overall.entries.iter().map(|e| e.name.as_str()));
    let max = overall.entries.iter().map(|e| e.total).max().unwrap_or(0).max(1) as f64;
    let scale = PLOT_W / max;
    let palette = theme.series_colors();

    let rows = overall.entries.len().max(1) as f64;
    let width = PAD_X * 2.0 + label_w + PLOT_W + 60.0;
    let height = PAD_TOP + rows * ROW_H + PAD_BOT;
    let mut svg = Svg::new(width, height, theme);
    svg.title(title, theme);

    let x0 = PAD_X + label_w;
    for (i, e) in overall.entries.iter().enumerate() {
        let y = PAD_TOP + i as f64 * ROW_H;
        svg.text(x0 - 8.0, y + BAR_H - 3.0, "end", theme.foreground(), false, &e.name);
        let mut x = x0;
        for (col, total) in e.per_repository.iter().enumerate() {
            let w = *total as f64 * scale;
            svg.rect(x, y, w, BAR_H, palette[col % palette.len()]);
            x += w;
        }
        svg.text(x + 6.0, y + BAR_H - 3.0, "start", theme.muted(), false, &e.total.to_string());
    }

    let legend: Vec<(&str, &str)> = overall
        .repositories
        .iter()
        .enumerate()
        .map(|(i, r)| (r.as_str(), palette[i % palette.len()]))
        .collect();
    svg.legend(&legend, theme);
    svg.finish()
}
