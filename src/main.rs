//! userstore - diagnostic dump of the local user database
//!
//! Opens the configured database, applies pending migrations and prints every
//! stored user. Passwords are never printed.
//!
//! Usage: `userstore [--config <PATH>] [--write-config] [--reset] [--json]`

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use userstore::constants::{APP_NAME, APP_VERSION};
use userstore::logging::init_file_logging;
use userstore::{StoreConfig, UserStore, UserSummary};

#[derive(Parser, Debug)]
#[command(name = "userstore")]
#[command(about = "Inspect the local user database", long_about = None)]
#[command(version)]
struct Options {
    /// Config file to read instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Save the effective configuration back to the config file
    #[arg(long)]
    write_config: bool,

    /// Drop every table and rebuild the schema (discards all users)
    #[arg(long)]
    reset: bool,

    /// Print users as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = Options::parse();

    let config_path = options.config.clone().unwrap_or_else(StoreConfig::default_path);
    let config = StoreConfig::load_from(&config_path)?;
    if options.write_config {
        config
            .save_to(&config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote {}", config_path.display());
    }

    // Initialize logging to file
    let _guard = init_file_logging(&config.log_dir)?;
    tracing::info!(version = APP_VERSION, "{} starting", APP_NAME);

    let store = UserStore::open(&config)
        .await
        .with_context(|| format!("opening {}", config.database_path.display()))?;

    let version = if options.reset {
        tracing::warn!("Factory reset requested");
        store.reset().await?
    } else {
        store.initialize().await?
    };

    let users: Vec<UserSummary> = store
        .list_all()
        .await?
        .iter()
        .map(UserSummary::from)
        .collect();

    if options.json {
        println!("{}", serde_json::to_string_pretty(&users)?);
    } else {
        println!(
            "{} (schema v{}, {} users)",
            config.database_path.display(),
            version,
            users.len()
        );
        for user in &users {
            println!(
                "{:>4}  {:<16} {:<24} {:<28} {}",
                user.id,
                user.username,
                format!("{} {}", user.first_name, user.last_name),
                user.email,
                user.avatar_path
            );
        }
    }

    store.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let options =
            Options::try_parse_from(["userstore", "--config", "/tmp/c.yaml", "--json"]).unwrap();
        assert_eq!(options.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert!(options.json);
        assert!(!options.reset);
        assert!(!options.write_config);

        let options = Options::try_parse_from(["userstore", "--reset", "--write-config"]).unwrap();
        assert_eq!(options.config, None);
        assert!(options.reset);
        assert!(options.write_config);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Options::try_parse_from(["userstore", "--frobnicate"]).is_err());
        assert!(Options::try_parse_from(["userstore", "--config"]).is_err());
    }
}
