use std::path::Path;

use anyhow::Result;
use reposcore_core::config::Config;
use reposcore_core::weights::ALL_RULES;

pub fn run(format: &str, config: Option<&Path>) -> Result<()> {
    let config = super::load_config(config)?;
    match format {
        "toml" => print!("{}", render_toml(&config)),
        "table" => print!("{}", render_table(&config)),
        other => anyhow::bail!("unknown format: {other} (expected table or toml)"),
    }
    Ok(())
}

fn render_table(config: &Config) -> String {
    let col_widths = (22usize, 7usize, 9usize);
    let mut out = format!(
        "{:<key$}  {:<def$}  {:<eff$}  Description\n",
        "Key",
        "Default",
        "Effective",
        key = col_widths.0,
        def = col_widths.1,
        eff = col_widths.2,
    );
    out.push_str(&format!(
        "{}\u{2500}{}\u{2500}{}\u{2500}{}\n",
        "\u{2500}".repeat(col_widths.0 + 1),
        "\u{2500}".repeat(col_widths.1 + 1),
        "\u{2500}".repeat(col_widths.2 + 1),
        "\u{2500}".repeat(40),
    ));

    for rule in ALL_RULES {
        let effective = config.rules.value(rule.key).unwrap_or(rule.default);
        let marker = if effective != rule.default { "*" } else { "" };
        out.push_str(&format!(
            "{:<key$}  {:<def$}  {:<eff$}  {}\n",
            rule.key,
            rule.default,
            format!("{effective}{marker}"),
            rule.description,
            key = col_widths.0,
            def = col_widths.1,
            eff = col_widths.2,
        ));
    }

    out.push_str("\nLabels:\n");
    for (label, category) in config.labels.iter() {
        out.push_str(&format!("  {label:<20} {category}\n"));
    }
    match &config.source {
        Some(p) => out.push_str(&format!("\nLoaded from {}\n", p.display())),
        None => out.push_str("\nUsing built-in defaults\n"),
    }
    out
}

fn render_toml(config: &Config) -> String {
    let mut out = String::from("# reposcore configuration (.reposcore.toml)\n");
    out.push_str("# Uncomment and edit lines to override defaults.\n");

    let mut section = "";
    for rule in ALL_RULES {
        let (table, field) = rule.key.split_once('.').unwrap_or(("", rule.key));
        if table != section {
            out.push_str(&format!("\n[{table}]\n"));
            section = table;
        }
        let value = config.rules.value(rule.key).unwrap_or(rule.default);
        out.push_str(&format!("# {field} = {value}   # {}\n", rule.description));
    }

    out.push_str("\n[labels]\n");
    for (label, category) in config.labels.iter() {
        let name = serde_json::to_value(category)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        out.push_str(&format!("# \"{label}\" = \"{name}\"\n"));
    }

    out.push_str("\n[ranking]\n");
    out.push_str("# tie_break = \"name\"            # or \"insertion\"\n");
    out.push_str("# filter_ranks = \"keep\"         # or \"rerank\"\n");
    out.push_str("# alias_collision = \"last_wins\" # or \"reject\"\n");

    out.push_str("\n[participants]\n");
    out.push_str("# exclude = [\"dependabot[bot]\"]\n");
    out
}
