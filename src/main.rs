use clap::{Parser, Subcommand};
use colored::*;

mod api;
mod app;
mod config;
mod errors;
mod models;
mod store;

use app::App;
use models::ticket::{Ticket, TicketPriority, TicketStatus, TicketUpdate};

#[derive(Parser)]
#[command(name = "ticketflow")]
#[command(version = "0.1.0")]
#[command(about = "Work your help-desk queue from the terminal", long_about = None)]
struct Cli {
    /// for debugging purposes
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init {
        /// (e.g., http://helpdesk.internal:8000)
        #[arg(long)]
        api_url: Option<String>,
    },

    /// Create an account on the backend
    Register {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        full_name: Option<String>,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: Option<String>,
    },

    /// Log out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List tickets
    List {
        /// Filter by status (open, in_progress, resolved, closed)
        #[arg(long, value_enum)]
        status: Option<TicketStatus>,

        /// Number of tickets to skip
        #[arg(long, default_value = "0")]
        skip: u32,

        /// Maximum number of tickets (default: 10)
        #[arg(long, default_value = "10")]
        limit: u32,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,

        /// Interactive mode - select a ticket to inspect
        #[arg(long, short)]
        interactive: bool,
    },

    /// Show a ticket with its comments
    Show {
        ticket_id: u64,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Create a new ticket
    New {
        /// Short summary of the problem
        #[arg(long)]
        title: Option<String>,

        /// Full description
        #[arg(long)]
        description: Option<String>,

        /// Priority (low, medium, high, critical)
        #[arg(long, value_enum)]
        priority: Option<TicketPriority>,
    },

    /// Update fields on a ticket
    Update {
        ticket_id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_enum)]
        status: Option<TicketStatus>,

        #[arg(long, value_enum)]
        priority: Option<TicketPriority>,

        /// Assign to a user by id
        #[arg(long)]
        assign: Option<u64>,
    },

    /// Close a ticket
    Close {
        ticket_id: u64,
    },

    /// Reopen a closed ticket
    Reopen {
        ticket_id: u64,
    },

    /// Delete a ticket
    Delete {
        ticket_id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Add a comment to a ticket
    Comment {
        ticket_id: u64,
        text: String,
    },

    /// List a ticket's comments
    Comments {
        ticket_id: u64,
    },

    /// Check the backend is up
    Health,

    /// Open the dashboard, a ticket, or the API docs in the browser
    Open {
        /// Optional ticket id. If not provided, opens the dashboard
        ticket_id: Option<u64>,

        /// Open the backend's interactive API docs instead
        #[arg(long)]
        docs: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Display current configuration
    Show,

    /// Set a specific configuration value
    Set {
        /// Configuration key (api.base_url or web.url)
        key: String,
        /// New value
        value: String,
    },

    /// Get the path to the config file
    Path,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing();
    }

    let quiet = suppress_banner(&cli.command);
    if !quiet {
        println!("{}", "TicketFlow v0.1.0".bright_cyan().bold());
        println!();
    }

    let result = match cli.command {
        Commands::Init { api_url } => handle_init(api_url).await,

        Commands::Register { email, username, full_name } => {
            handle_register(email, username, full_name).await
        }

        Commands::Login { email } => handle_login(email).await,

        Commands::Logout => handle_logout(),

        Commands::Whoami => handle_whoami(),

        Commands::List { status, skip, limit, json, interactive } => {
            handle_list(status, skip, limit, json, interactive).await
        }

        Commands::Show { ticket_id, json } => handle_show(ticket_id, json).await,

        Commands::New { title, description, priority } => {
            handle_new(title, description, priority).await
        }

        Commands::Update { ticket_id, title, description, status, priority, assign } => {
            handle_update(ticket_id, title, description, status, priority, assign).await
        }

        Commands::Close { ticket_id } => {
            handle_transition(ticket_id, TicketStatus::Closed, "closed").await
        }

        Commands::Reopen { ticket_id } => {
            handle_transition(ticket_id, TicketStatus::Open, "reopened").await
        }

        Commands::Delete { ticket_id, force } => handle_delete(ticket_id, force).await,

        Commands::Comment { ticket_id, text } => handle_comment(ticket_id, &text).await,

        Commands::Comments { ticket_id } => handle_comments(ticket_id).await,

        Commands::Health => handle_health().await,

        Commands::Open { ticket_id, docs } => handle_open(ticket_id, docs),

        Commands::Config { action } => handle_config(action),
    };

    if let Err(e) = result {
        eprintln!("\n{}", e);
        std::process::exit(1);
    }

    if !quiet {
        println!();
    }
}

/// Commands whose stdout is meant for pipes get no banner and no trailing
/// blank line.
fn suppress_banner(command: &Commands) -> bool {
    matches!(
        command,
        Commands::List { json: true, .. }
            | Commands::Show { json: true, .. }
            | Commands::Config {
                action: ConfigAction::Path
            }
    )
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ticketflow=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_init(api_url: Option<String>) -> anyhow::Result<()> {
    use api::client::ApiClient;
    use config::settings::{ApiConfig, Settings, WebConfig};
    use std::io::Write;
    use std::sync::Arc;
    use store::credentials::FileCredentialStore;
    use store::session::SessionHandle;

    println!("{}", "TicketFlow Setup".cyan().bold());
    println!();
    println!(
        "{}",
        "This will store settings in ~/.ticketflow/config.toml".dimmed()
    );
    println!();

    let current = Settings::load_file().unwrap_or_default();

    let default_api = api_url.unwrap_or(current.api.base_url);
    let api_url = prompt_with_default("Help Desk API URL", &default_api)?;
    let web_url = prompt_with_default("Web dashboard URL", &current.web.url)?;

    let settings = Settings {
        api: ApiConfig {
            base_url: api_url.trim_end_matches('/').to_string(),
        },
        web: WebConfig {
            url: web_url.trim_end_matches('/').to_string(),
        },
    };

    println!();
    print!("{}", "  Testing backend connection... ".dimmed());
    std::io::stdout().flush()?;

    let credentials = Arc::new(FileCredentialStore::new(FileCredentialStore::default_path()?));
    let client = ApiClient::new(&settings.api.base_url, SessionHandle::new(), credentials);

    match client.health_check().await {
        Ok(_) => {
            println!("{}", "✓".green().bold());
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            return Err(anyhow::anyhow!(
                "{}",
                errors::TicketFlowError::ConfigValidationFailed(e.to_string())
            ));
        }
    }

    settings.save()?;

    let config_path = Settings::config_path()?;
    println!();
    println!("{}", "Configuration saved!".green().bold());
    println!(
        "  Location: {}",
        config_path.display().to_string().bright_white()
    );
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Create an account: {}", "ticketflow register".green());
    println!("  2. Log in: {}", "ticketflow login".green());

    Ok(())
}

async fn handle_register(
    email: Option<String>,
    username: Option<String>,
    full_name: Option<String>,
) -> anyhow::Result<()> {
    use dialoguer::Password;
    use models::user::RegisterRequest;

    println!("{}", "Create a Help Desk account".cyan().bold());
    println!();

    let app = App::new()?;

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let username = match username {
        Some(username) => username,
        None => prompt("Username")?,
    };
    validate_username(&username).map_err(form_error)?;

    let full_name = match full_name {
        Some(name) if !name.trim().is_empty() => Some(name),
        Some(_) => None,
        None => {
            let name = prompt("Full name (optional)")?;
            if name.is_empty() {
                None
            } else {
                Some(name)
            }
        }
    };

    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords don't match")
        .interact()?;
    validate_password(&password).map_err(form_error)?;

    let user = app
        .client
        .register(&RegisterRequest {
            email,
            username,
            password,
            full_name,
        })
        .await
        .map_err(api_error)?;

    println!();
    println!("{}", "✓ Account created!".green().bold());
    println!("  {} {}", "Username:".bold(), user.username.bright_white());
    println!("  {} {}", "Email:".bold(), user.email.bright_white());
    println!();
    println!("{}", "  Next: ticketflow login".dimmed());

    Ok(())
}

async fn handle_login(email: Option<String>) -> anyhow::Result<()> {
    use dialoguer::Password;

    println!("{}", "Log in to the Help Desk".cyan().bold());
    println!();

    let mut app = App::new()?;

    let email = match email {
        Some(email) => email,
        None => prompt("Email")?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let user = app
        .session
        .login(&app.client, &email, &password)
        .await
        .map_err(api_error)?;

    println!();
    println!("{}", "✓ Logged in!".green().bold());
    println!("  {} {}", "User:".bold(), user.display_name().bright_white());
    println!("  {} {}", "Email:".bold(), user.email.dimmed());

    Ok(())
}

fn handle_logout() -> anyhow::Result<()> {
    let mut app = App::new()?;

    let was_authenticated = app.session.is_authenticated();
    app.session.logout(&app.client).map_err(api_error)?;

    if was_authenticated {
        println!("{}", "✓ Logged out".green().bold());
    } else {
        println!("{}", "No stored session; nothing to do".dimmed());
    }

    Ok(())
}

fn handle_whoami() -> anyhow::Result<()> {
    let app = App::new()?;

    match app.session.user() {
        Some(user) => {
            println!("{}", "Signed in".green().bold());
            println!();
            println!("  {} {}", "Username:".bold(), user.username.bright_white());
            println!("  {} {}", "Email:".bold(), user.email.bright_white());
            if let Some(name) = &user.full_name {
                println!("  {} {}", "Name:".bold(), name.bright_white());
            }
            if user.is_admin {
                println!("  {} {}", "Role:".bold(), "admin".yellow());
            }
            println!(
                "  {} {}",
                "Member since:".bold(),
                format_timestamp(&user.created_at).dimmed()
            );
        }
        None => {
            println!("{}", "Not logged in".yellow());
            println!("  {}", "Run 'ticketflow login' to sign in".dimmed());
        }
    }

    Ok(())
}

async fn handle_list(
    status: Option<TicketStatus>,
    skip: u32,
    limit: u32,
    json_output: bool,
    interactive: bool,
) -> anyhow::Result<()> {
    let mut app = App::new()?;
    app.require_auth()?;

    app.tickets.fetch_tickets(&app.client, skip, limit, status).await;

    if let Some(message) = app.tickets.error() {
        return Err(escalate_fetch_error(&app, message));
    }

    // JSON output
    if json_output {
        let json = serde_json::to_string_pretty(app.tickets.tickets())?;
        println!("{}", json);
        return Ok(());
    }

    // Pretty terminal output
    match status {
        Some(status) => println!("{}", format!("Tickets ({})", status).cyan().bold()),
        None => println!("{}", "Tickets".cyan().bold()),
    }
    println!();

    if app.tickets.tickets().is_empty() {
        println!("{}", "  No tickets found".dimmed());
        return Ok(());
    }

    println!(
        "  {} tickets shown (skip {})",
        app.tickets.tickets().len().to_string().bright_white(),
        skip
    );
    println!();

    for item in app.tickets.tickets() {
        println!(
            "  {} [{}]  {}  {}",
            format!("#{}", item.id).bright_white().bold(),
            status_label(item.status),
            truncate(&item.title, 48),
            priority_label(item.priority)
        );
    }

    // Interactive mode - pick a row and show its detail
    if interactive {
        use dialoguer::Select;

        println!();
        let items: Vec<String> = app
            .tickets
            .tickets()
            .iter()
            .map(|t| format!("#{} [{}] {}", t.id, t.status, truncate(&t.title, 48)))
            .collect();

        let selection = Select::new()
            .with_prompt("Select a ticket to inspect")
            .items(&items)
            .interact_opt()?;

        if let Some(index) = selection {
            let ticket_id = app.tickets.tickets()[index].id;
            println!();
            return show_ticket(&mut app, ticket_id, false).await;
        } else {
            println!("\n{}", "No ticket selected".yellow());
        }
    }

    Ok(())
}

async fn handle_show(ticket_id: u64, json_output: bool) -> anyhow::Result<()> {
    let mut app = App::new()?;
    app.require_auth()?;

    show_ticket(&mut app, ticket_id, json_output).await
}

async fn show_ticket(app: &mut App, ticket_id: u64, json_output: bool) -> anyhow::Result<()> {
    app.tickets.fetch_ticket(&app.client, ticket_id).await;

    if let Some(message) = app.tickets.error() {
        return Err(escalate_fetch_error(app, message));
    }

    let ticket = app.tickets.current_ticket().ok_or_else(|| {
        anyhow::anyhow!("{}", errors::TicketFlowError::TicketNotFound(ticket_id))
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(ticket)?);
        return Ok(());
    }

    render_ticket(ticket);
    Ok(())
}

async fn handle_new(
    title: Option<String>,
    description: Option<String>,
    priority: Option<TicketPriority>,
) -> anyhow::Result<()> {
    println!("{}", "New ticket".cyan().bold());
    println!();

    let mut app = App::new()?;
    app.require_auth()?;

    let title = match title {
        Some(title) => title,
        None => prompt("Title")?,
    };
    validate_title(&title).map_err(form_error)?;

    let description = match description {
        Some(description) => description,
        None => prompt("Description")?,
    };
    validate_description(&description).map_err(form_error)?;

    let priority = match priority {
        Some(priority) => priority,
        None => {
            use dialoguer::Select;

            let options = [
                TicketPriority::Low,
                TicketPriority::Medium,
                TicketPriority::High,
                TicketPriority::Critical,
            ];
            let index = Select::new()
                .with_prompt("Priority")
                .items(&["low", "medium", "high", "critical"])
                .default(1)
                .interact()?;
            options[index]
        }
    };

    let ticket = app
        .tickets
        .create_ticket(&app.client, title.trim(), description.trim(), priority)
        .await
        .map_err(api_error)?;

    println!();
    println!("{}", "✓ Ticket created!".green().bold());
    println!(
        "  {} {}",
        "Id:".bold(),
        format!("#{}", ticket.id).bright_white()
    );
    println!("  {} {}", "Title:".bold(), ticket.title.bright_white());
    println!("  {} {}", "Status:".bold(), status_label(ticket.status));
    println!("  {} {}", "Priority:".bold(), priority_label(ticket.priority));

    Ok(())
}

async fn handle_update(
    ticket_id: u64,
    title: Option<String>,
    description: Option<String>,
    status: Option<TicketStatus>,
    priority: Option<TicketPriority>,
    assign: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(title) = &title {
        validate_title(title).map_err(form_error)?;
    }
    if let Some(description) = &description {
        validate_description(description).map_err(form_error)?;
    }

    let patch = TicketUpdate {
        title,
        description,
        status,
        priority,
        assigned_to_id: assign,
    };
    if patch.is_empty() {
        return Err(anyhow::anyhow!(
            "{}",
            errors::TicketFlowError::Other(
                "Nothing to update. Pass at least one of --title, --description, --status, \
                 --priority, --assign"
                    .to_string()
            )
        ));
    }

    let mut app = App::new()?;
    app.require_auth()?;

    let ticket = app
        .tickets
        .update_ticket(&app.client, ticket_id, &patch)
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    println!("{}", format!("✓ Ticket #{} updated", ticket.id).green().bold());
    println!("  {} {}", "Title:".bold(), ticket.title.bright_white());
    println!("  {} {}", "Status:".bold(), status_label(ticket.status));
    println!("  {} {}", "Priority:".bold(), priority_label(ticket.priority));
    if let Some(assigned) = &ticket.assigned_to {
        println!(
            "  {} {}",
            "Assigned to:".bold(),
            assigned.display_name().bright_white()
        );
    }

    Ok(())
}

async fn handle_transition(
    ticket_id: u64,
    status: TicketStatus,
    verb: &str,
) -> anyhow::Result<()> {
    let mut app = App::new()?;
    app.require_auth()?;

    let patch = TicketUpdate {
        status: Some(status),
        ..Default::default()
    };

    let ticket = app
        .tickets
        .update_ticket(&app.client, ticket_id, &patch)
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    println!(
        "{}",
        format!("✓ Ticket #{} {}", ticket.id, verb).green().bold()
    );
    println!("  {} {}", "Title:".bold(), ticket.title.bright_white());
    println!("  {} {}", "Status:".bold(), status_label(ticket.status));
    if let Some(resolved_at) = &ticket.resolved_at {
        println!(
            "  {} {}",
            "Resolved:".bold(),
            format_timestamp(resolved_at).dimmed()
        );
    }

    Ok(())
}

async fn handle_delete(ticket_id: u64, force: bool) -> anyhow::Result<()> {
    let mut app = App::new()?;
    app.require_auth()?;

    let ticket = app
        .client
        .get_ticket(ticket_id)
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete ticket #{} \"{}\"?",
                ticket.id,
                truncate(&ticket.title, 40)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".yellow());
            return Ok(());
        }
    }

    app.tickets
        .delete_ticket(&app.client, ticket_id)
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    println!(
        "{}",
        format!("✓ Ticket #{} deleted", ticket_id).green().bold()
    );

    Ok(())
}

async fn handle_comment(ticket_id: u64, text: &str) -> anyhow::Result<()> {
    validate_comment(text).map_err(form_error)?;

    let app = App::new()?;
    app.require_auth()?;

    let comment = app
        .client
        .add_comment(ticket_id, text.trim())
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    println!(
        "{}",
        format!("✓ Comment added to ticket #{}", ticket_id)
            .green()
            .bold()
    );
    println!();
    println!(
        "  {} {}",
        comment.author.username.bold(),
        format_timestamp(&comment.created_at).dimmed()
    );
    println!("  {}", comment.content);

    Ok(())
}

async fn handle_comments(ticket_id: u64) -> anyhow::Result<()> {
    let app = App::new()?;
    app.require_auth()?;

    let comments = app
        .client
        .get_comments(ticket_id)
        .await
        .map_err(|e| ticket_api_error(e, ticket_id))?;

    println!(
        "{}",
        format!("Comments on ticket #{}", ticket_id).cyan().bold()
    );
    println!();

    if comments.is_empty() {
        println!("{}", "  No comments yet".dimmed());
        return Ok(());
    }

    for comment in &comments {
        println!(
            "  {} {}",
            comment.author.username.bold(),
            format_timestamp(&comment.created_at).dimmed()
        );
        println!("  {}", comment.content);
        println!();
    }

    Ok(())
}

async fn handle_health() -> anyhow::Result<()> {
    let app = App::new()?;

    println!("{}", "Checking backend health...".cyan().bold());
    println!();
    println!(
        "  {} {}",
        "Backend:".bold(),
        app.client.base_url().bright_white()
    );

    let health = app.client.health_check().await.map_err(api_error)?;

    println!("  {} {}", "Status:".bold(), health.status.green());

    Ok(())
}

fn handle_open(ticket_id: Option<u64>, docs: bool) -> anyhow::Result<()> {
    use config::settings::Settings;

    let settings = Settings::load()?;

    let url = if docs {
        docs_url(&settings.api.base_url)
    } else {
        match ticket_id {
            Some(id) => ticket_web_url(&settings.web.url, id),
            None => dashboard_url(&settings.web.url),
        }
    };

    println!("{} {}", "Opening:".dimmed(), url.bright_white());
    open::that(&url)?;

    Ok(())
}

fn handle_config(action: ConfigAction) -> anyhow::Result<()> {
    use config::settings::{Settings, API_URL_ENV};

    match action {
        ConfigAction::Show => {
            let settings = Settings::load()?;

            println!("{}", "Current Configuration".cyan().bold());
            println!();

            println!("{}", "[api]".bold());
            println!(
                "  {} {}",
                "base_url:".dimmed(),
                settings.api.base_url.bright_white()
            );

            println!();
            println!("{}", "[web]".bold());
            println!("  {} {}", "url:".dimmed(), settings.web.url.bright_white());

            if std::env::var(API_URL_ENV).is_ok() {
                println!();
                println!(
                    "{}",
                    format!("  base_url is overridden by {}", API_URL_ENV).yellow()
                );
            }

            Ok(())
        }

        ConfigAction::Set { key, value } => {
            let mut settings = Settings::load_file()?;

            match key.as_str() {
                "api.base_url" => settings.api.base_url = value.clone(),
                "web.url" => settings.web.url = value.clone(),
                _ => {
                    return Err(anyhow::anyhow!(
                        "Unknown configuration key: {}. Valid keys: api.base_url, web.url",
                        key
                    ))
                }
            }

            settings.save()?;

            println!(
                "{}",
                format!("✓ Updated {} to: {}", key, value).green().bold()
            );

            Ok(())
        }

        ConfigAction::Path => {
            println!("{}", Settings::config_path()?.display());
            Ok(())
        }
    }
}

fn prompt(message: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{}: ", message.bright_white());
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(message: &str, default: &str) -> anyhow::Result<String> {
    use std::io::Write;
    print!("{} [{}]: ", message.bright_white(), default.dimmed());
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    let trimmed = input.trim();
    if trimmed.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(trimmed.to_string())
    }
}

fn render_ticket(ticket: &Ticket) {
    println!(
        "{}",
        format!("Ticket #{}: {}", ticket.id, ticket.title).cyan().bold()
    );
    println!();

    println!("  {} {}", "Status:".bold(), status_label(ticket.status));
    println!("  {} {}", "Priority:".bold(), priority_label(ticket.priority));
    println!(
        "  {} {}",
        "Created by:".bold(),
        ticket.creator.display_name().bright_white()
    );
    match &ticket.assigned_to {
        Some(user) => println!(
            "  {} {}",
            "Assigned to:".bold(),
            user.display_name().bright_white()
        ),
        None => println!("  {} {}", "Assigned to:".bold(), "unassigned".dimmed()),
    }
    println!(
        "  {} {}",
        "Created:".bold(),
        format_timestamp(&ticket.created_at).dimmed()
    );
    println!(
        "  {} {}",
        "Updated:".bold(),
        format_timestamp(&ticket.updated_at).dimmed()
    );
    if let Some(resolved_at) = &ticket.resolved_at {
        println!(
            "  {} {}",
            "Resolved:".bold(),
            format_timestamp(resolved_at).dimmed()
        );
    }

    println!();
    println!("{}", "Description".bold());
    for line in ticket.description.lines() {
        println!("  {}", line);
    }

    if !ticket.comments.is_empty() {
        println!();
        println!(
            "{}",
            format!("Comments ({})", ticket.comments.len()).bold()
        );
        for comment in &ticket.comments {
            println!();
            println!(
                "  {} {}",
                comment.author.username.bold(),
                format_timestamp(&comment.created_at).dimmed()
            );
            println!("  {}", comment.content);
        }
    }
}

fn status_label(status: TicketStatus) -> ColoredString {
    match status {
        TicketStatus::Open => "open".yellow(),
        TicketStatus::InProgress => "in_progress".blue(),
        TicketStatus::Resolved => "resolved".green(),
        TicketStatus::Closed => "closed".bright_black(),
    }
}

fn priority_label(priority: TicketPriority) -> ColoredString {
    match priority {
        TicketPriority::Low => "low".green(),
        TicketPriority::Medium => "medium".yellow(),
        TicketPriority::High => "high".red(),
        TicketPriority::Critical => "critical".red().bold(),
    }
}

/// Escalates a fetch failure the store recorded into a command error. If the
/// shared session vanished during the command, the failure was a 401 and the
/// stored token has already been dropped.
fn escalate_fetch_error(app: &App, message: &str) -> anyhow::Error {
    if !app.session.is_authenticated() {
        anyhow::anyhow!(
            "{}",
            errors::TicketFlowError::AuthFailed(401, message.to_string())
        )
    } else {
        anyhow::anyhow!("{}", errors::TicketFlowError::Other(message.to_string()))
    }
}

fn api_error(err: api::client::ApiError) -> anyhow::Error {
    anyhow::anyhow!("{}", errors::TicketFlowError::from(err))
}

fn ticket_api_error(err: api::client::ApiError, ticket_id: u64) -> anyhow::Error {
    anyhow::anyhow!(
        "{}",
        errors::TicketFlowError::from_api(err, Some(ticket_id))
    )
}

fn form_error(message: String) -> anyhow::Error {
    anyhow::anyhow!("{}", errors::TicketFlowError::ValidationFailed(message))
}

fn format_timestamp(timestamp: &chrono::NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M").to_string()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let shortened: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", shortened)
    }
}

fn ticket_web_url(web_url: &str, ticket_id: u64) -> String {
    format!("{}/tickets/{}", web_url.trim_end_matches('/'), ticket_id)
}

fn dashboard_url(web_url: &str) -> String {
    format!("{}/dashboard", web_url.trim_end_matches('/'))
}

fn docs_url(api_url: &str) -> String {
    format!("{}/docs", api_url.trim_end_matches('/'))
}

fn validate_title(title: &str) -> Result<(), String> {
    let len = title.trim().chars().count();
    if len < 5 {
        return Err("Title must be at least 5 characters".to_string());
    }
    if len > 255 {
        return Err("Title must be at most 255 characters".to_string());
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<(), String> {
    let len = description.trim().chars().count();
    if len < 10 {
        return Err("Description must be at least 10 characters".to_string());
    }
    if len > 5000 {
        return Err("Description must be at most 5000 characters".to_string());
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().chars().count() < 3 {
        return Err("Username must be at least 3 characters".to_string());
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), String> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    Ok(())
}

fn validate_comment(text: &str) -> Result<(), String> {
    let len = text.trim().chars().count();
    if len == 0 {
        return Err("Comment cannot be empty".to_string());
    }
    if len > 5000 {
        return Err("Comment must be at most 5000 characters".to_string());
    }
    Ok(())
}
