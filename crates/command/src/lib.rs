//! The `/pagerduty` slash command.
//!
//! [`CommandHandler`] parses the command line, asks an [`OnCallSource`] for
//! data, and renders the result as Markdown text. Rendering never fails:
//! upstream errors come back as a text response.

mod autocomplete;
mod handler;
mod render;
mod response;
mod source;

pub use autocomplete::{AutocompleteData, CommandRegistration, registration};
pub use handler::{CommandHandler, Subcommand};
pub use render::{help_text, render_on_calls, render_schedules};
pub use response::{CommandResponse, ResponseType};
pub use source::OnCallSource;

/// Trigger word the command is registered under.
pub const COMMAND_TRIGGER: &str = "pagerduty";
