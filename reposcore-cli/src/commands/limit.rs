use anyhow::{Context, Result};
use reposcore_core::github::{GithubClient, GithubConfig};

use crate::output;

pub fn run(token: Option<&str>) -> Result<()> {
    let token = super::resolve_token(token)?;
    let client = GithubClient::new(GithubConfig::default(), token.as_deref())?;
    let limit = client.rate_limit().context("failed to query rate limit")?;
    println!("{}", output::format_rate_limit(&limit));
    Ok(())
}
