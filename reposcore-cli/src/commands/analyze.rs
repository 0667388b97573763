use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use reposcore_core::alias::AliasTable;
use reposcore_core::cache::Cache;
use reposcore_core::chart::{overall_chart, score_chart, weekly_chart};
use reposcore_core::colors::{theme_by_name, ChartTheme};
use reposcore_core::config::{Config, RankingOptions};
use reposcore_core::github::{parse_repo_list, GithubClient, GithubConfig, RepoName};
use reposcore_core::html::Dashboard;
use reposcore_core::output::{format_csv, format_overall_csv, format_overall_text, format_text, OutputFormat};
use reposcore_core::pipeline::{Analysis, Pipeline};
use reposcore_core::projection::{averages, lookup, lookup_overall, project, project_overall, ProjectionOptions};
use reposcore_core::report::{OverallCohort, RankedCohort, Standing};
use reposcore_core::weights::ScoringRules;

use crate::output::{self, PlannedRepo};
use crate::{FormatArg, RunArgs};

const OVERALL_DIR: &str = "overall";

pub fn run(repo_args: &[String], args: &RunArgs) -> Result<()> {
    let repos = parse_repo_list(repo_args)?;
    if repos.is_empty() {
        anyhow::bail!("no repository given; pass owner/repo (see --help)");
    }
    let config = super::load_config(args.config.as_deref())?;
    let formats = resolve_formats(&args.format);
    let theme = theme_by_name(&args.theme).with_context(|| format!("unknown theme: {}", args.theme))?;
    let aliases = match &args.user_info {
        Some(path) => AliasTable::load(path)?,
        None => AliasTable::default(),
    };
    let projection = ProjectionOptions {
        min_score: args.min_contributions,
        top: args.top,
        filter_ranks: config.ranking.filter_ranks,
    };

    if args.dry_run {
        print_plan(&repos, &formats, args, &config);
        return Ok(());
    }

    let token = super::resolve_token(args.token.as_deref())?;
    if token.is_none() {
        tracing::warn!("no GitHub token; unauthenticated requests are limited to 60 per hour");
    }
    let client = GithubClient::new(GithubConfig::default(), token.as_deref())?
        .with_labels(config.labels.clone())
        .with_semester_start(args.semester_start);
    if args.check_limit {
        let limit = client.rate_limit().context("failed to query rate limit")?;
        println!("{}", output::format_rate_limit(&limit));
    }

    let cache = Cache::open(&args.output)?;
    let settings = Settings::new(&repos, args, &formats, &config);
    let pipeline = Pipeline::new(Box::new(client), config)
        .with_aliases(aliases)
        .with_cache(cache, args.use_cache)
        .with_semester_start(args.semester_start);

    let pb = ProgressBar::new(repos.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} [{pos}/{len}] {msg}") {
        pb.set_style(style);
    }
    let analysis = pipeline.run(&repos, |repo| {
        pb.set_message(format!("fetching {repo}"));
        pb.inc(1);
    });
    let analysis = match analysis {
        Ok(a) => {
            pb.finish_and_clear();
            a
        }
        Err(e) => {
            pb.abandon();
            return Err(e);
        }
    };

    let writer = Writer { root: &args.output, formats: &formats, theme, grade: args.grade, weekly: args.weekly_chart };
    let mut dashboard = Dashboard::new("Contribution scores", theme);
    write_analysis(&writer, &analysis, &projection, &mut dashboard)?;

    if formats.contains(&OutputFormat::Html) {
        writer.write(&args.output.join("index.html"), &dashboard.render())?;
    }
    let json = serde_json::to_string_pretty(&settings).context("failed to serialize settings")?;
    writer.write(&args.output.join("settings.json"), &json)?;

    if let Some(login) = &args.user {
        let standing = user_standing(&analysis, pipeline.aliases(), login);
        println!("{}", output::format_standing(login, standing.as_ref()));
    }
    Ok(())
}

/// Summed per-repository totals for multi-repository runs, else the single
/// repository's cohort.
fn user_standing(analysis: &Analysis, aliases: &AliasTable, login: &str) -> Option<Standing> {
    match &analysis.overall {
        Some(overall) => lookup_overall(overall, aliases, login),
        None => analysis.repos.first().and_then(|r| lookup(&r.cohort, aliases, login)),
    }
}

fn resolve_formats(args: &[FormatArg]) -> BTreeSet<OutputFormat> {
    args.iter()
        .flat_map(|f| match f {
            FormatArg::Table => vec![OutputFormat::Table],
            FormatArg::Text  => vec![OutputFormat::Text],
            FormatArg::Chart => vec![OutputFormat::Chart],
            FormatArg::Html  => vec![OutputFormat::Html],
            FormatArg::All   => OutputFormat::all().to_vec(),
        })
        .collect()
}

fn repo_dir(root: &Path, repo: &RepoName) -> PathBuf {
    root.join(format!("{}_{}", repo.owner(), repo.repo()))
}

fn print_plan(repos: &[RepoName], formats: &BTreeSet<OutputFormat>, args: &RunArgs, config: &Config) {
    let cache = Cache::at(&args.output);
    let cache_paths: Vec<PathBuf> = repos.iter().map(|r| cache.path_for(r)).collect();
    let out_dirs: Vec<PathBuf> = repos.iter().map(|r| repo_dir(&args.output, r)).collect();
    let planned: Vec<PlannedRepo<'_>> = repos
        .iter()
        .zip(cache_paths.iter().zip(&out_dirs))
        .map(|(r, (cache, output))| PlannedRepo { name: r.to_string(), cache, output })
        .collect();
    let formats: Vec<String> = formats.iter().map(ToString::to_string).collect();
    print!("{}", output::format_plan(&planned, &formats, args.use_cache, config.source.as_deref()));
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

struct Writer<'a> {
    root: &'a Path,
    formats: &'a BTreeSet<OutputFormat>,
    theme: &'static dyn ChartTheme,
    grade: bool,
    weekly: bool,
}

impl Writer<'_> {
    fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }

    fn write(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| format!("cannot create {}", parent.display()))?;
        }
        std::fs::write(path, contents).with_context(|| format!("cannot write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "wrote output");
        Ok(())
    }

    /// score.csv, score.txt and charts for one cohort under `dir`. Returns
    /// the rendered SVGs so the dashboard can inline them.
    fn cohort(
        &self,
        dir: &Path,
        title: &str,
        cohort: &RankedCohort,
        weekly: &reposcore_core::activity::WeeklyActivity,
    ) -> Result<Vec<String>> {
        if self.wants(OutputFormat::Table) {
            self.write(&dir.join("score.csv"), &format_csv(cohort))?;
        }
        if self.wants(OutputFormat::Text) {
            self.write(&dir.join("score.txt"), &format_text(cohort, &averages(cohort)))?;
        }

        let mut charts = Vec::new();
        if self.wants(OutputFormat::Chart) || self.wants(OutputFormat::Html) {
            charts.push(score_chart(cohort, title, self.theme, self.grade));
            if self.weekly {
                charts.push(weekly_chart(weekly, &format!("{title} weekly activity"), self.theme));
            }
        }
        if self.wants(OutputFormat::Chart) {
            let name = if self.grade { "chart_grade.svg" } else { "chart.svg" };
            self.write(&dir.join(name), &charts[0])?;
            if let Some(svg) = charts.get(1) {
                self.write(&dir.join("weekly_activity.svg"), svg)?;
            }
        }
        Ok(charts)
    }

    fn overall(&self, dir: &Path, overall: &OverallCohort) -> Result<Vec<String>> {
        if self.wants(OutputFormat::Table) {
            self.write(&dir.join("overall_scores.csv"), &format_overall_csv(overall))?;
        }
        if self.wants(OutputFormat::Text) {
            self.write(&dir.join("overall_scores.txt"), &format_overall_text(overall))?;
        }
        let mut charts = Vec::new();
        if self.wants(OutputFormat::Chart) || self.wants(OutputFormat::Html) {
            charts.push(overall_chart(overall, "Overall scores", self.theme));
        }
        if self.wants(OutputFormat::Chart) {
            self.write(&dir.join("overall_chart.svg"), &charts[0])?;
        }
        Ok(charts)
    }
}

fn write_analysis(
    writer: &Writer<'_>,
    analysis: &Analysis,
    projection: &ProjectionOptions,
    dashboard: &mut Dashboard<'_>,
) -> Result<()> {
    for scores in &analysis.repos {
        let title = scores.repo.to_string();
        let shown = project(&scores.cohort, projection);
        let charts = writer.cohort(
            &repo_dir(writer.root, &scores.repo),
            &title,
            &shown,
            &scores.activity.weekly_activity,
        )?;
        dashboard.add_cohort(&title, &shown, &charts);
        println!("{}", output::format_pretty(&title, &shown));
    }

    if let (Some(ratio), Some(overall)) = (&analysis.ratio, &analysis.overall) {
        let dir = writer.root.join(OVERALL_DIR);
        let shown = project(ratio, projection);
        let charts = writer.cohort(&dir, "All repositories", &shown, &analysis.weekly)?;
        dashboard.add_cohort("All repositories (merged activity)", &shown, &charts);

        let overall = project_overall(overall, projection);
        let charts = writer.overall(&dir, &overall)?;
        dashboard.add_overall("All repositories (summed totals)", &overall, &charts);
        println!("{}", output::format_pretty("all repositories", &shown));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// settings.json
// ---------------------------------------------------------------------------

/// Parameters of a run, written next to the results.
#[derive(Serialize)]
struct Settings {
    generated_at: DateTime<Utc>,
    repositories: Vec<String>,
    formats: Vec<String>,
    grade: bool,
    use_cache: bool,
    theme: String,
    weekly_chart: bool,
    semester_start: Option<NaiveDate>,
    min_contributions: u64,
    top: Option<usize>,
    config: Option<PathBuf>,
    rules: ScoringRules,
    ranking: RankingOptions,
}

impl Settings {
    fn new(repos: &[RepoName], args: &RunArgs, formats: &BTreeSet<OutputFormat>, config: &Config) -> Self {
        Self {
            generated_at: Utc::now(),
            repositories: repos.iter().map(ToString::to_string).collect(),
            formats: formats.iter().map(ToString::to_string).collect(),
            grade: args.grade,
            use_cache: args.use_cache,
            theme: args.theme.clone(),
            weekly_chart: args.weekly_chart,
            semester_start: args.semester_start,
            min_contributions: args.min_contributions,
            top: args.top,
            config: config.source.clone(),
            rules: config.rules,
            ranking: config.ranking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reposcore_core::activity::{ActivityCounts, ActivityMap, RepoActivity, WeeklyActivity, WeeklyCounts};
    use reposcore_core::colors::DefaultTheme;
    use reposcore_core::github::StaticSource;

    fn analysis(repos: &[&str]) -> Analysis {
        let mut source = StaticSource::default();
        for (i, r) in repos.iter().enumerate() {
            let participants: ActivityMap = [
                ("kim".to_string(), ActivityCounts { pr_feature_bug: 2, pr_doc: 1, ..Default::default() }),
                (format!("solo{i}"), ActivityCounts { issue_doc: 3, ..Default::default() }),
            ]
            .into_iter()
            .collect();
            let activity = RepoActivity {
                update_time: 1,
                participants,
                weekly_activity: WeeklyActivity::from([(1, WeeklyCounts { pr: 3, issue: 0 })]),
                semester_start: None,
            };
            source = source.with(r.parse().unwrap(), activity);
        }
        let names: Vec<RepoName> = repos.iter().map(|r| r.parse().unwrap()).collect();
        Pipeline::new(Box::new(source), Config::default()).run(&names, |_| {}).unwrap()
    }

    static THEME: DefaultTheme = DefaultTheme;

    // The CLI default for --min-contributions.
    fn min_one() -> ProjectionOptions {
        ProjectionOptions { min_score: 1, ..Default::default() }
    }

    fn writer<'a>(root: &'a Path, formats: &'a BTreeSet<OutputFormat>, weekly: bool) -> Writer<'a> {
        Writer { root, formats, theme: &THEME, grade: false, weekly }
    }

    #[test]
    fn all_expands_to_every_format() {
        let f = resolve_formats(&[FormatArg::Table, FormatArg::All]);
        assert_eq!(f.len(), OutputFormat::all().len());
        assert_eq!(resolve_formats(&[FormatArg::Text]), BTreeSet::from([OutputFormat::Text]));
    }

    #[test]
    fn single_repository_writes_repo_dir_only() {
        let dir = tempfile::tempdir().unwrap();
        let formats: BTreeSet<_> = OutputFormat::all().iter().copied().collect();
        let mut dash = Dashboard::new("t", &THEME);
        write_analysis(&writer(dir.path(), &formats, true), &analysis(&["o/a"]), &min_one(), &mut dash)
            .unwrap();

        let repo = dir.path().join("o_a");
        for f in ["score.csv", "score.txt", "chart.svg", "weekly_activity.svg"] {
            assert!(repo.join(f).is_file(), "{f} missing");
        }
        assert!(!dir.path().join(OVERALL_DIR).exists());
        // Issue-only participant scores 0 and falls under the minimum.
        let csv = std::fs::read_to_string(repo.join("score.csv")).unwrap();
        assert!(!csv.contains("solo0"));
        assert!(csv.contains("kim,1,6,2,0,0,0,8,100"));
    }

    #[test]
    fn multiple_repositories_write_overall() {
        let dir = tempfile::tempdir().unwrap();
        let formats = BTreeSet::from([OutputFormat::Table, OutputFormat::Chart]);
        let mut dash = Dashboard::new("t", &THEME);
        write_analysis(&writer(dir.path(), &formats, false), &analysis(&["o/a", "o/b"]), &min_one(), &mut dash)
            .unwrap();

        let overall = dir.path().join(OVERALL_DIR);
        for f in ["score.csv", "overall_scores.csv", "chart.svg", "overall_chart.svg"] {
            assert!(overall.join(f).is_file(), "{f} missing");
        }
        assert!(!overall.join("score.txt").exists());
        assert!(!overall.join("weekly_activity.svg").exists());
        let totals = std::fs::read_to_string(overall.join("overall_scores.csv")).unwrap();
        assert_eq!(totals.lines().nth(1), Some("1,kim,8,8,16"), "{totals}");
        assert_eq!(totals.lines().count(), 2, "zero totals are filtered:\n{totals}");
    }

    #[test]
    fn user_standing_across_repositories_matches_overall_totals() {
        let counts = |pr_feature_bug, pr_doc, issue_feature_bug| ActivityCounts {
            pr_feature_bug,
            pr_doc,
            issue_feature_bug,
            ..Default::default()
        };
        let a = RepoActivity {
            participants: ActivityMap::from([("amy".to_string(), counts(1, 0, 0)), ("bo".to_string(), counts(1, 1, 0))]),
            ..Default::default()
        };
        let b = RepoActivity {
            participants: ActivityMap::from([("amy".to_string(), counts(0, 0, 10))]),
            ..Default::default()
        };
        let source = StaticSource::default().with("o/a".parse().unwrap(), a).with("o/b".parse().unwrap(), b);
        let repos: Vec<RepoName> = vec!["o/a".parse().unwrap(), "o/b".parse().unwrap()];
        let analysis = Pipeline::new(Box::new(source), Config::default()).run(&repos, |_| {}).unwrap();

        let standing = user_standing(&analysis, &AliasTable::default(), "amy").unwrap();
        let overall = analysis.overall.as_ref().unwrap().get("amy").unwrap();
        assert_eq!((standing.rank, standing.total), (overall.rank, overall.total));
        assert_eq!((standing.rank, standing.total), (2, 3));
    }

    #[test]
    fn user_standing_for_single_repository() {
        let analysis = analysis(&["o/a"]);
        let s = user_standing(&analysis, &AliasTable::default(), "kim").unwrap();
        assert_eq!((s.rank, s.total, s.cohort_size), (1, 8, 2));
        assert!(user_standing(&analysis, &AliasTable::default(), "nobody").is_none());
    }

    #[test]
    fn settings_serialize_run_parameters() {
        let repos: Vec<RepoName> = vec!["o/a".parse().unwrap()];
        let args = RunArgs {
            output: PathBuf::from("results"),
            format: vec![FormatArg::All],
            grade: true,
            use_cache: false,
            token: Some("secret".into()),
            check_limit: false,
            user_info: None,
            user: None,
            theme: "dark".into(),
            weekly_chart: false,
            semester_start: None,
            min_contributions: 1,
            top: Some(5),
            dry_run: false,
            config: None,
        };
        let formats = resolve_formats(&args.format);
        let json = serde_json::to_value(Settings::new(&repos, &args, &formats, &Config::default())).unwrap();
        assert_eq!(json["repositories"][0], "o/a");
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["top"], 5);
        assert_eq!(json["rules"]["weights"]["doc_pr"], 2);
        assert!(!json.to_string().contains("secret"));
    }
}
