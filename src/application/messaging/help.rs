//! Built-in help command

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::domain::entities::{CommandRegistry, Handler};

static HORIZONTAL_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("whitespace regex is valid"));

const LINE_BREAK: &str = "\u{1f}";

pub const HELP_TEMPLATE: &str = "help";
pub const HELP_DESCRIPTION: &str = "List all available commands";

/// Normalize free-form help text.
///
/// Single newlines join lines, blank lines become a single newline and runs
/// of spaces or tabs collapse to one space.
pub fn parse_help_text(help_text: &str) -> String {
    let joined = help_text
        .trim()
        .replace('\n', LINE_BREAK)
        .replace(&LINE_BREAK.repeat(2), "\n")
        .replace(LINE_BREAK, "");
    HORIZONTAL_SPACE.replace_all(&joined, " ").into_owned()
}

/// Render the listing of every visible command, in registration order.
pub fn help_text(registry: &CommandRegistry, base_help_text: &str) -> String {
    let mut text = String::new();
    if !base_help_text.is_empty() {
        text.push_str(base_help_text);
        text.push('\n');
    }
    for command in registry.all().filter(|c| !c.is_hidden()) {
        let description = parse_help_text(command.help_text().unwrap_or(""));
        text.push_str(&format!("*{}* - {}\n", command.template(), description));
    }
    text
}

/// The handler registered as `help` when enabled in config.
pub fn help_handler(base_help_text: impl Into<String>) -> Handler {
    let base = base_help_text.into();
    Handler::new("help", move |ctx, _| Ok(help_text(ctx.registry(), &base))).describe(HELP_DESCRIPTION)
}
