// src/conversation/commands.rs
//! Slash-command table and the router built from it once at startup.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    RandomDrink,
    FindByIngredients,
    FindDrink,
    Next,
    RepeatIngredients,
    Ingredients,
    Cancel,
}

pub struct CommandEntry {
    pub name: &'static str,
    pub command: Command,
    pub description: &'static str,
    /// Shown in the menu text.
    pub listed: bool,
}

pub const COMMAND_TABLE: &[CommandEntry] = &[
    CommandEntry {
        name: "start",
        command: Command::Start,
        description: "start over",
        listed: false,
    },
    CommandEntry {
        name: "help",
        command: Command::Help,
        description: "show this menu",
        listed: true,
    },
    CommandEntry {
        name: "random_drink",
        command: Command::RandomDrink,
        description: "get a random drink",
        listed: true,
    },
    CommandEntry {
        name: "find_by_ingredients",
        command: Command::FindByIngredients,
        description: "find a drink by ingredients",
        listed: true,
    },
    CommandEntry {
        name: "find_drink",
        command: Command::FindDrink,
        description: "find a drink by name",
        listed: true,
    },
    CommandEntry {
        name: "next",
        command: Command::Next,
        description: "another drink like the last one",
        listed: true,
    },
    CommandEntry {
        name: "repeat_ingredients",
        command: Command::RepeatIngredients,
        description: "search your last ingredients again",
        listed: true,
    },
    CommandEntry {
        name: "ingredients",
        command: Command::Ingredients,
        description: "list known ingredients",
        listed: true,
    },
    CommandEntry {
        name: "cancel",
        command: Command::Cancel,
        description: "back to the menu",
        listed: true,
    },
];

/// One inbound chat event, already classified.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    Command { command: Command, args: String },
    UnknownCommand(String),
    Text(String),
}

pub struct CommandRouter {
    commands: HashMap<&'static str, Command>,
}

lazy_static::lazy_static! {
    /// Process-wide, read-only after construction.
    pub static ref ROUTER: CommandRouter = CommandRouter::from_table(COMMAND_TABLE);
}

impl CommandRouter {
    pub fn from_table(table: &[CommandEntry]) -> Self {
        let commands = table
            .iter()
            .map(|entry| (entry.name, entry.command))
            .collect();
        Self { commands }
    }

    pub fn lookup(&self, name: &str) -> Option<Command> {
        self.commands.get(name.to_lowercase().as_str()).copied()
    }

    /// Classifies raw message text. `/cmd@SomeBot args` is a command, anything
    /// else is text.
    pub fn route(&self, text: &str) -> InboundEvent {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return InboundEvent::Text(trimmed.to_string());
        };

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or(head);

        match self.lookup(name) {
            Some(command) => InboundEvent::Command {
                command,
                args: args.to_string(),
            },
            None => InboundEvent::UnknownCommand(name.to_string()),
        }
    }
}
