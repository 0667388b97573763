pub mod analyze;
pub mod limit;
pub mod weights;

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use reposcore_core::config::Config;

/// `--config` wins; otherwise discover `.reposcore.toml` from the working directory.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Ok(Config::from_file(path)?),
        None => {
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            Ok(Config::discover(&cwd))
        }
    }
}

/// `-` reads the token from the first line of stdin; blank means anonymous.
pub fn resolve_token(raw: Option<&str>) -> Result<Option<String>> {
    let token = match raw {
        Some("-") => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read token from stdin")?;
            line
        }
        Some(t) => t.to_string(),
        None => return Ok(None),
    };
    let token = token.trim();
    Ok((!token.is_empty()).then(|| token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_token_is_trimmed() {
        assert_eq!(resolve_token(Some(" abc \n")).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn blank_or_missing_token_is_anonymous() {
        assert_eq!(resolve_token(Some("  ")).unwrap(), None);
        assert_eq!(resolve_token(None).unwrap(), None);
    }
}
