use colored::*;
use std::fmt;

use crate::api::client::ApiError;

#[derive(Debug)]
pub enum TicketFlowError {
    // Configuration errors
    ConfigInvalid(String),
    ConfigValidationFailed(String),

    // Session errors
    NotLoggedIn,
    AuthFailed(u16, String),
    SessionStorage(String),

    // Ticket errors
    TicketNotFound(u64),
    PermissionDenied(String),
    ValidationFailed(String),
    ApiError(u16, String),

    // Network errors
    NetworkError(String),

    // Generic error
    Other(String),
}

impl TicketFlowError {
    /// Maps a wire-level failure onto the user-facing taxonomy. When the
    /// operation had a concrete ticket as its subject, pass its id so 404s
    /// can name it.
    pub fn from_api(err: ApiError, ticket_id: Option<u64>) -> Self {
        match err {
            ApiError::Status { status: 401, detail } => TicketFlowError::AuthFailed(401, detail),
            ApiError::Status { status: 403, detail } => TicketFlowError::PermissionDenied(detail),
            ApiError::Status { status: 404, detail } => match ticket_id {
                Some(id) => TicketFlowError::TicketNotFound(id),
                None => TicketFlowError::ApiError(404, detail),
            },
            ApiError::Status { status: 422, detail } => TicketFlowError::ValidationFailed(detail),
            ApiError::Status { status, detail } => TicketFlowError::ApiError(status, detail),
            ApiError::Network(msg) => TicketFlowError::NetworkError(msg),
            ApiError::Storage(msg) => TicketFlowError::SessionStorage(msg),
        }
    }
}

impl fmt::Display for TicketFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Configuration errors
            TicketFlowError::ConfigInvalid(msg) => {
                write!(f, "{}\n", "Invalid configuration".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check your config file: ~/.ticketflow/config.toml\n")?;
                write!(f, "   2. Or reinitialize: {}", "ticketflow init".green())
            }
            TicketFlowError::ConfigValidationFailed(msg) => {
                write!(f, "{}\n", "Could not reach the backend".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check the API URL is correct\n")?;
                write!(f, "   2. Verify the backend is running\n")?;
                write!(f, "   3. Then run {} again", "ticketflow init".green())
            }

            // Session errors
            TicketFlowError::NotLoggedIn => {
                write!(f, "{}\n", "Not logged in".red().bold())?;
                write!(f, "   {}\n\n", "This command needs an authenticated session".dimmed())?;
                write!(f, "   {}", "ticketflow login".green())
            }
            TicketFlowError::AuthFailed(status, msg) => {
                write!(f, "{}\n", format!("Authentication failed ({})", status).red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Your stored session has been cleared\n\n")?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Log in again: {}\n", "ticketflow login".green())?;
                write!(f, "   2. Or create an account: {}", "ticketflow register".green())
            }
            TicketFlowError::SessionStorage(msg) => {
                write!(f, "{}\n", "Session storage error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check permissions on ~/.ticketflow\n")?;
                write!(f, "   2. Then log in again: {}", "ticketflow login".green())
            }

            // Ticket errors
            TicketFlowError::TicketNotFound(ticket_id) => {
                write!(f, "{}\n", format!("Ticket #{} not found", ticket_id).red().bold())?;
                write!(f, "   {}\n\n", "It may have been deleted, or the id is wrong".dimmed())?;
                write!(f, "   To list your tickets: {}", "ticketflow list".green())
            }
            TicketFlowError::PermissionDenied(msg) => {
                write!(f, "{}\n", "Permission denied".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Only the ticket's creator or an admin can change it")
            }
            TicketFlowError::ValidationFailed(msg) => {
                write!(f, "{}\n", "Validation failed".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
            TicketFlowError::ApiError(status, msg) => {
                write!(f, "{}\n", format!("Help Desk API error ({})", status).red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   Try again or check the backend logs")
            }

            // Network errors
            TicketFlowError::NetworkError(msg) => {
                write!(f, "{}\n", "Network error".red().bold())?;
                write!(f, "   {}\n\n", msg.dimmed())?;
                write!(f, "   To fix:\n")?;
                write!(f, "   1. Check the backend is running: {}\n", "ticketflow health".green())?;
                write!(f, "   2. Verify the URL in ~/.ticketflow/config.toml\n")?;
                write!(f, "   3. Or override it: {}", "TICKETFLOW_API_URL=http://host:8000".green())
            }

            // Generic
            TicketFlowError::Other(msg) => {
                write!(f, "{}\n", "Error".red().bold())?;
                write!(f, "   {}", msg.dimmed())
            }
        }
    }
}

impl std::error::Error for TicketFlowError {}

impl From<ApiError> for TicketFlowError {
    fn from(err: ApiError) -> Self {
        TicketFlowError::from_api(err, None)
    }
}
