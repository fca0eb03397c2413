//! Status command - show discovered repositories

use clap::Args;
use gitair_core::{classify, discover, GitRepo, SyncSettings};

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show remote URLs
    #[arg(long)]
    pub urls: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub fn execute(&self, settings: &SyncSettings) -> anyhow::Result<()> {
        let repos = discover(&settings.root);

        if repos.is_empty() {
            println!("No git repositories found under {}", settings.root.display());
            return Ok(());
        }

        println!("{} repositories under {}", repos.len(), settings.root.display());
        println!();

        for record in &repos {
            let classification = classify(record.path(), settings.force_composite);
            println!("{} [{}]", record.name(), classification);
            println!("  Path:    {}", record.path().display());

            let repo = match GitRepo::open(record.path()) {
                Ok(repo) => repo,
                Err(e) => {
                    println!("  Error:   {}", e);
                    println!();
                    continue;
                }
            };

            let branch = match repo.current_branch() {
                Ok(Some(branch)) => branch,
                Ok(None) => "(detached or unborn)".to_string(),
                Err(e) => format!("(unknown: {})", e),
            };
            let head = repo.head_short_id().unwrap_or_else(|| "-".to_string());
            println!("  Branch:  {} ({})", branch, head);

            let state = match repo.is_dirty() {
                Ok(true) => "uncommitted changes".to_string(),
                Ok(false) => "clean".to_string(),
                Err(e) => format!("unknown ({})", e),
            };
            println!("  State:   {}", state);

            let remotes = repo.list_remotes()?;
            if remotes.is_empty() {
                println!("  Remotes: none");
            } else {
                for remote in remotes {
                    match (self.urls, remote.url) {
                        (true, Some(url)) => println!("  Remote:  {} {}", remote.name, url),
                        _ => println!("  Remote:  {}", remote.name),
                    }
                }
            }
            println!();
        }

        Ok(())
    }
}
