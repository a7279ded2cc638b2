use anyhow::{Context, Result};
use colored::Colorize;
use studio_application::DashboardController;

/// Installs a module and waits for the backend answer.
pub async fn run(controller: &DashboardController, module: &str) -> Result<()> {
    println!("📦 Installing {}...", module);

    let handle = controller.install_module(module)?;
    let response = handle.await.context("Install task panicked")??;

    println!("{}", format!("✅ Installed {}", module).green());
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
