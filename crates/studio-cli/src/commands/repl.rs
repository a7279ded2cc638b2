use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use studio_application::{DashboardController, ReplyStatus};
use studio_core::StudioError;
use studio_core::blueprint::Blueprint;
use studio_core::project::LifecycleEvent;
use tokio::sync::broadcast::error::RecvError;

use super::projects::format_project;

const COMMANDS: [&str; 11] = [
    "/projects",
    "/pending",
    "/deploy",
    "/confirm",
    "/cancel",
    "/remove",
    "/blueprint",
    "/install",
    "/reset",
    "/help",
    "/quit",
];

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum ReplCommand {
    Projects,
    Pending,
    Deploy(String),
    /// Confirms the given request, or the only pending one
    Confirm(Option<String>),
    Cancel(Option<String>),
    Remove(String),
    Blueprint,
    Install(String),
    Reset,
    Help,
    Quit,
    Message(String),
    Invalid(String),
}

fn required(name: &str, arg: Option<String>, build: fn(String) -> ReplCommand) -> ReplCommand {
    match arg {
        Some(value) => build(value),
        None => ReplCommand::Invalid(format!("Usage: {name} <id>")),
    }
}

fn parse_line(line: &str) -> ReplCommand {
    let trimmed = line.trim();
    if trimmed == "quit" || trimmed == "exit" {
        return ReplCommand::Quit;
    }
    if !trimmed.starts_with('/') {
        return ReplCommand::Message(trimmed.to_string());
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::to_string);

    match command {
        "/projects" => ReplCommand::Projects,
        "/pending" => ReplCommand::Pending,
        "/deploy" => required("/deploy", arg, ReplCommand::Deploy),
        "/confirm" => ReplCommand::Confirm(arg),
        "/cancel" => ReplCommand::Cancel(arg),
        "/remove" => required("/remove", arg, ReplCommand::Remove),
        "/blueprint" => ReplCommand::Blueprint,
        "/install" => required("/install", arg, ReplCommand::Install),
        "/reset" => ReplCommand::Reset,
        "/help" => ReplCommand::Help,
        "/quit" | "/exit" => ReplCommand::Quit,
        other => ReplCommand::Invalid(format!("Unknown command: {other}")),
    }
}

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_help() {
    println!("{}", "Commands:".bright_black());
    println!("{}", "  /projects            list projects".bright_black());
    println!("{}", "  /pending             list deploy requests awaiting confirmation".bright_black());
    println!("{}", "  /deploy <project>    request a deploy".bright_black());
    println!("{}", "  /confirm [request]   confirm a deploy request".bright_black());
    println!("{}", "  /cancel [request]    cancel a deploy request".bright_black());
    println!("{}", "  /remove <project>    remove a project".bright_black());
    println!("{}", "  /blueprint           show the session blueprint".bright_black());
    println!("{}", "  /install <module>    install a marketplace module".bright_black());
    println!("{}", "  /reset               clear blueprint and transcript".bright_black());
    println!("{}", "Anything else is sent to TEOS Gen.".bright_black());
}

fn print_assistant(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
}

fn print_blueprint(blueprint: &Blueprint) {
    println!("{}", format!("◆ {}", blueprint.app_name).bright_magenta().bold());
    if !blueprint.stack.is_empty() {
        println!("  stack:    {}", blueprint.stack.join(", "));
    }
    if !blueprint.features.is_empty() {
        println!("  features: {}", blueprint.features.join(", "));
    }
    if let Some(compliance) = &blueprint.compliance {
        println!("  {}", compliance.green());
    }
}

fn print_error(err: &StudioError) {
    eprintln!("{}", format!("Error: {err}").red());
}

fn print_event(event: &LifecycleEvent) {
    println!(
        "{}",
        format!("[{}] {} → {}", event.project_id, event.from, event.to).yellow()
    );
}

/// Resolves an optional request id to the only pending request.
async fn resolve_request(
    controller: &DashboardController,
    request_id: Option<String>,
) -> std::result::Result<String, String> {
    if let Some(id) = request_id {
        return Ok(id);
    }
    let pending = controller.orchestrator().pending_requests().await;
    match pending.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err("No pending deploy requests".to_string()),
        _ => Err("Several requests are pending, pass a request id".to_string()),
    }
}

fn spawn_message(controller: Arc<DashboardController>, input: String) {
    tokio::spawn(async move {
        // The controller bounds the provider call with `[provider] request_timeout_ms`
        match controller.handle_user_message(&input).await {
            Ok(outcome) => {
                print_assistant(&outcome.reply.content);
                if outcome.status == ReplyStatus::BlueprintStored {
                    if let Some(blueprint) = controller.blueprint().await {
                        print_blueprint(&blueprint);
                    }
                }
            }
            Err(err) => print_error(&err),
        }
    });
}

/// Applies one non-message command. Returns false when the REPL should stop.
async fn dispatch(controller: &Arc<DashboardController>, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Quit => return false,
        ReplCommand::Help => print_help(),
        ReplCommand::Invalid(message) => println!("{}", message.bright_black()),
        ReplCommand::Message(input) => {
            println!("{}", format!("> {}", input).green());
            spawn_message(controller.clone(), input);
        }
        ReplCommand::Projects => {
            for project in controller.projects().await {
                println!("{}", format_project(&project));
            }
        }
        ReplCommand::Pending => {
            let pending = controller.orchestrator().pending_requests().await;
            if pending.is_empty() {
                println!("{}", "No pending deploy requests".bright_black());
            }
            for request in pending {
                println!("{}  project {}", request.id, request.project_id);
            }
        }
        ReplCommand::Deploy(project_id) => match controller.request_deploy(&project_id).await {
            Ok(request) => {
                println!(
                    "{}",
                    format!("Deploy requested for {project_id}. Confirm with /confirm {}", request.id)
                        .bright_yellow()
                );
            }
            Err(err) => print_error(&err),
        },
        ReplCommand::Confirm(request_id) => match resolve_request(controller, request_id).await {
            Ok(id) => match controller.confirm_deploy(&id).await {
                Ok(request) => println!(
                    "{}",
                    format!("Deploy of {} confirmed", request.project_id).green()
                ),
                Err(err) => print_error(&err),
            },
            Err(message) => println!("{}", message.bright_black()),
        },
        ReplCommand::Cancel(request_id) => match resolve_request(controller, request_id).await {
            Ok(id) => match controller.cancel_deploy(&id).await {
                Ok(request) => println!(
                    "{}",
                    format!("Deploy of {} cancelled", request.project_id).bright_black()
                ),
                Err(err) => print_error(&err),
            },
            Err(message) => println!("{}", message.bright_black()),
        },
        ReplCommand::Remove(project_id) => match controller.remove_project(&project_id).await {
            Ok(project) => println!("{}", format!("Removed {}", project.name).bright_black()),
            Err(err) => print_error(&err),
        },
        ReplCommand::Blueprint => match controller.blueprint().await {
            Some(blueprint) => print_blueprint(&blueprint),
            None => println!("{}", "No blueprint generated yet".bright_black()),
        },
        ReplCommand::Install(module) => match controller.install_module(&module) {
            Ok(_) => println!("{}", format!("Installing {module} in the background").bright_black()),
            Err(err) => print_error(&err),
        },
        ReplCommand::Reset => match controller.reset_session().await {
            Ok(()) => {
                println!("{}", "Session reset".bright_black());
                if let Some(greeting) = controller.history().await.first() {
                    print_assistant(&greeting.content);
                }
            }
            Err(err) => print_error(&err),
        },
    }
    true
}

/// Runs the interactive dashboard session.
///
/// Chat messages run in the background so the prompt stays
/// responsive; lifecycle transitions are printed as they happen.
pub async fn run(controller: Arc<DashboardController>) -> Result<()> {
    let mut events = controller.subscribe();
    let event_printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => print_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Lifecycle event printer lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut rl = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    let snapshot = controller.snapshot().await;
    println!("{}", "=== TEOS Studio ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Provider: {} | type /help for commands", snapshot.provider_mode).bright_black()
    );
    println!();
    for message in &snapshot.messages {
        print_assistant(&message.content);
    }

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                if !dispatch(&controller, parse_line(&line)).await {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    event_printer.abort();
    Ok(())
}
