use super::{Captures, Handler, Pattern};
use crate::application::errors::CommandError;

/// Registration flags for a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub case_sensitive: bool,
    pub help_text: Option<String>,
    pub hidden: bool,
}

impl CommandOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Override the handler's own description in the help listing.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help_text = Some(text.into());
        self
    }

    /// Leave the command out of the help listing.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Represents a bot command
#[derive(Debug)]
pub struct Command {
    pattern: Pattern,
    aliases: Vec<Pattern>,
    handler: Handler,
    help_text: Option<String>,
    hidden: bool,
}

impl Command {
    /// `template` is expected to carry the prefix already.
    pub fn new(template: &str, handler: Handler, options: CommandOptions) -> Result<Self, CommandError> {
        let pattern = Pattern::compile_with_optional(template, options.case_sensitive, &handler.defaulted_params())?;
        Ok(Self {
            pattern,
            aliases: Vec::new(),
            handler,
            help_text: options.help_text,
            hidden: options.hidden,
        })
    }

    pub fn template(&self) -> &str {
        self.pattern.template()
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn is_case_sensitive(&self) -> bool {
        self.pattern.is_case_sensitive()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn aliases(&self) -> &[Pattern] {
        &self.aliases
    }

    /// The override if one was given, else the handler's description.
    pub fn help_text(&self) -> Option<&str> {
        self.help_text.as_deref().or_else(|| self.handler.description())
    }

    fn add_alias(&mut self, template: &str) -> Result<(), CommandError> {
        let alias = Pattern::compile_with_optional(
            template,
            self.pattern.is_case_sensitive(),
            &self.handler.defaulted_params(),
        )?;
        self.aliases.push(alias);
        Ok(())
    }

    /// Aliases are only consulted when the primary pattern does not match.
    pub fn matches(&self, text: &str) -> Option<Captures> {
        self.pattern
            .matches(text)
            .or_else(|| self.aliases.iter().find_map(|alias| alias.matches(text)))
    }
}

/// Command registry, searched in registration order
#[derive(Debug, Default)]
pub struct CommandRegistry {
    prefix: Option<String>,
    commands: Vec<Command>,
}

impl CommandRegistry {
    /// An empty prefix disables prefixing and prefix checks.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
            commands: Vec::new(),
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn prefixed(&self, template: &str) -> String {
        format!("{}{}", self.prefix.as_deref().unwrap_or(""), template)
    }

    pub fn register(&mut self, template: &str, handler: Handler, options: CommandOptions) -> Result<(), CommandError> {
        let template = self.prefixed(template);
        if self.commands.iter().any(|c| c.template() == template) {
            return Err(CommandError::Duplicate(template));
        }

        let command = Command::new(&template, handler, options)?;
        tracing::debug!("Command {} added", template);
        self.commands.push(command);
        Ok(())
    }

    /// Attach an extra pattern to the most recently registered command.
    pub fn register_alias(&mut self, template: &str) -> Result<(), CommandError> {
        let template = self.prefixed(template);
        let command = self
            .commands
            .last_mut()
            .ok_or_else(|| CommandError::NoCommandForAlias(template.clone()))?;
        command.add_alias(&template)?;
        tracing::debug!("Alias {} added to {}", template, command.template());
        Ok(())
    }

    /// First command (in registration order) whose pattern or alias matches.
    pub fn find(&self, text: &str) -> Option<(&Command, Captures)> {
        self.commands
            .iter()
            .find_map(|command| command.matches(text).map(|captures| (command, captures)))
    }

    pub fn get(&self, template: &str) -> Option<&Command> {
        let template = self.prefixed(template);
        self.commands.iter().find(|c| c.template() == template)
    }

    pub fn all(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
