use anyhow::Result;
use colored::Colorize;
use studio_application::DashboardController;
use studio_core::project::{Project, ProjectStatus};

pub async fn list(controller: &DashboardController, json: bool) -> Result<()> {
    let projects = controller.projects().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    for project in &projects {
        println!("{}", format_project(project));
    }
    Ok(())
}

pub fn format_project(project: &Project) -> String {
    let status = match project.status {
        ProjectStatus::Active => project.status.to_string().green(),
        ProjectStatus::Building => project.status.to_string().yellow(),
        ProjectStatus::ComplianceCheck => project.status.to_string().cyan(),
    };
    format!(
        "{:<4}{:<22}{:<18}{:>4}%  {}  {}",
        project.id,
        project.name.bold(),
        status,
        project.compliance_score,
        project.tech_stack.join(", ").bright_black(),
        project.last_updated.bright_black(),
    )
}
