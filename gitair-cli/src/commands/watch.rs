//! Default command - run the reconciliation loop

use std::sync::Arc;

use clap::Args;
use gitair_core::{classify, discover, Scheduler, SyncSettings};

use crate::console::ConsoleReporter;

/// Arguments for running the loop
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Run a single commit/push and pull pass, then exit
    #[arg(long)]
    pub once: bool,
}

impl WatchArgs {
    /// Discover repositories and run the loop over them
    pub async fn execute(&self, settings: SyncSettings) -> anyhow::Result<()> {
        println!("Git Air - auto sync all git repositories");
        println!("Check interval: {:.1} minutes", settings.check_interval.as_secs_f64() / 60.0);
        if settings.force_composite {
            println!("Monorepo mode: FORCED");
        } else {
            println!("Monorepo mode: AUTO-DETECT");
        }
        match &settings.messages {
            Some(messages) => println!("Commit messages: GENERATED (via {})", messages.command),
            None => println!("Commit messages: TIMESTAMP"),
        }
        println!();

        let repos = discover(&settings.root);
        if repos.is_empty() {
            println!("No git repositories found under {}", settings.root.display());
            println!("Make sure you're in a directory containing git repositories");
            return Ok(());
        }

        println!("Found {} git repositories", repos.len());
        for repo in &repos {
            let classification = classify(repo.path(), settings.force_composite);
            println!("  {} [{}]", repo.path().display(), classification);
        }
        println!();

        let scheduler = Scheduler::new(settings, repos, Arc::new(ConsoleReporter));

        if self.once {
            scheduler.run_once().await;
        } else {
            scheduler.run().await?;
        }

        Ok(())
    }
}
