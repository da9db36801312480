use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Configuration {
    pub authentication: Authentication,
    pub commands: HashMap<String, Command>,
}
impl Default for Configuration {
    fn default() -> Self {
        Self {
            authentication: Authentication {
                discord_token: None,
            },
            commands: HashMap::from_iter(
                CommandKind::ALL
                    .iter()
                    .map(|kind| (kind.name().to_string(), Command::new(kind.description()))),
            ),
        }
    }
}
impl Configuration {
    const FILENAME: &str = "config.toml";

    pub fn load() -> anyhow::Result<Self> {
        let config = if let Ok(file) = std::fs::read_to_string(Self::FILENAME) {
            toml::from_str(&file).context("failed to load config")?
        } else {
            Self::default()
        };
        config.save()?;

        Ok(config)
    }

    fn save(&self) -> anyhow::Result<()> {
        Ok(std::fs::write(
            Self::FILENAME,
            toml::to_string_pretty(self)?,
        )?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Authentication {
    pub discord_token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Command {
    pub enabled: bool,
    pub description: String,
}
impl Command {
    fn new(description: &str) -> Self {
        Self {
            enabled: true,
            description: description.to_string(),
        }
    }
}

/// The fixed set of commands the bot knows how to run. Config entries are
/// keyed by these names; an entry whose key matches none of them is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Roll,
    Damage,
    Advantage,
    Disadvantage,
    Stats,
    Help,
}
impl CommandKind {
    pub const ALL: [CommandKind; 6] = [
        CommandKind::Roll,
        CommandKind::Damage,
        CommandKind::Advantage,
        CommandKind::Disadvantage,
        CommandKind::Stats,
        CommandKind::Help,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Roll => "roll",
            CommandKind::Damage => "damage",
            CommandKind::Advantage => "advantage",
            CommandKind::Disadvantage => "disadvantage",
            CommandKind::Stats => "stats",
            CommandKind::Help => "help",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Roll => "Roll dice with the modifier applied to each die.",
            CommandKind::Damage => "Roll damage: sum each pool, then add the modifier.",
            CommandKind::Advantage => "Roll twice and keep the higher total.",
            CommandKind::Disadvantage => "Roll twice and keep the lower total.",
            CommandKind::Stats => "Roll ability scores: 4d6 drop lowest, six times.",
            CommandKind::Help => "Show dice notation help.",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_every_command() {
        let config = Configuration::default();
        for kind in CommandKind::ALL {
            let command = config.commands.get(kind.name()).unwrap();
            assert!(command.enabled);
            assert!(!command.description.is_empty());
        }
    }

    #[test]
    fn command_kind_round_trips_names() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(CommandKind::from_name("fireball"), None);
    }
}
