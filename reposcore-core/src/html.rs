use html_escape::encode_text;

use crate::colors::ChartTheme;
use crate::output::SCORE_COLUMNS;
use crate::report::{OverallCohort, RankedCohort};

/// `index.html`: one section per repository plus the overall sections.
///
/// Charts are inlined as SVG produced by [`crate::chart`]; every other piece
/// of text is escaped.
pub struct Dashboard<'a> {
    title: String,
    theme: &'a dyn ChartTheme,
    sections: Vec<String>,
}

impl<'a> Dashboard<'a> {
    pub fn new(title: &str, theme: &'a dyn ChartTheme) -> Self {
        Self { title: title.to_string(), theme, sections: Vec::new() }
    }

    pub fn add_cohort(&mut self, heading: &str, cohort: &RankedCohort, charts: &[String]) {
        let mut table = String::from("<table>\n<thead><tr>");
        for col in SCORE_COLUMNS {
            table.push_str(&format!("<th>{}</th>", encode_text(col)));
        }
        table.push_str("</tr></thead>\n<tbody>\n");
        for e in cohort.iter() {
            let s = &e.score;
            table.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
                encode_text(&e.name),
                s.rank,
                s.feat_bug_pr,
                s.doc_pr,
                s.typo_pr,
                s.feat_bug_issue,
                s.doc_issue,
                s.total,
                s.rate
            ));
        }
        table.push_str("</tbody>\n</table>");
        self.push_section(heading, &table, charts);
    }

    pub fn add_overall(&mut self, heading: &str, overall: &OverallCohort, charts: &[String]) {
        let mut table = String::from("<table>\n<thead><tr><th>rank</th><th>name</th>");
        for repo in &overall.repositories {
            table.push_str(&format!("<th>{}</th>", encode_text(repo)));
        }
        table.push_str("<th>total</th></tr></thead>\n<tbody>\n");
        for e in &overall.entries {
            table.push_str(&format!("<tr><td>{}</td><td>{}</td>", e.rank, encode_text(&e.name)));
            for t in &e.per_repository {
                table.push_str(&format!("<td>{t}</td>"));
            }
            table.push_str(&format!("<td>{}</td></tr>\n", e.total));
        }
        table.push_str("</tbody>\n</table>");
        self.push_section(heading, &table, charts);
    }

    fn push_section(&mut self, heading: &str, table: &str, charts: &[String]) {
        let mut s = format!("<section>\n<h2>{}</h2>\n", encode_text(heading));
        for svg in charts {
            s.push_str("<div class=\"chart\">\n");
            s.push_str(svg);
            s.push_str("</div>\n");
        }
        s.push_str(table);
        s.push_str("\n</section>");
        self.sections.push(s);
    }

    pub fn render(&self) -> String {
        let t = self.theme;
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <style>\n\
             body {{ background: {bg}; color: {fg}; font-family: system-ui, sans-serif; margin: 2rem; }}\n\
             table {{ border-collapse: collapse; margin: 1rem 0; }}\n\
             th, td {{ border: 1px solid {muted}; padding: 0.25rem 0.6rem; text-align: right; }}\n\
             th:first-child, td:first-child {{ text-align: left; }}\n\
             section {{ margin-bottom: 3rem; }}\n\
             </style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n",
            title = encode_text(&self.title),
            bg = t.background(),
            fg = t.foreground(),
            muted = t.muted(),
            body = self.sections.join("\n"),
        )
    }
}
