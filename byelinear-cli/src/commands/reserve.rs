//! Reserve command - hold a GitHub issue number ahead of a migration

use byelinear_core::{Config, Secrets};
use clap::Args;

use super::github_client;

/// Arguments for the reserve command
#[derive(Args, Debug)]
pub struct ReserveArgs {
    /// Issue number to hold with an open placeholder
    #[arg(long)]
    pub until: u64,

    /// Target repository (owner/repo)
    #[arg(short, long)]
    pub repo: Option<String>,
}

impl ReserveArgs {
    /// Execute the reserve command
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let secrets = Secrets::load()?;
        let client = github_client(config, &secrets)?;

        let reservation = client.reserve_number(self.until).await?;
        println!(
            "Burned {} issue number(s) in {}/{}",
            reservation.burned,
            client.owner(),
            client.repo()
        );
        println!(
            "#{} is held by a placeholder: {}",
            reservation.issue.number, reservation.issue.html_url
        );
        println!("`byelinear migrate --preserve-numbers` fills it in");
        Ok(())
    }
}
