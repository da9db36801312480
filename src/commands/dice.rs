use std::collections::HashMap;

use anyhow::Context;
use serenity::all::{
    Command, CommandInteraction, CommandOptionType, CreateCommand, CreateCommandOption,
    CreateEmbed, CreateEmbedFooter, Http, User,
};

use crate::{
    config::{self, CommandKind},
    constant::{color, limits, value},
    dice::{notation, roll},
    util::{self, RespondableInteraction},
};

use super::CommandHandler;

/// Discord rejects empty embed field names; a zero-width space reads as one.
const BLANK_FIELD_NAME: &str = "\u{200B}";

pub struct Handler {
    commands: HashMap<String, config::Command>,
}
impl Handler {
    pub fn new(config: &config::Configuration) -> Self {
        Self {
            commands: config.commands.clone(),
        }
    }

    fn enabled_commands(&self) -> impl Iterator<Item = (CommandKind, &config::Command)> {
        self.commands.iter().filter_map(|(name, command)| {
            if !command.enabled {
                return None;
            }
            Some((CommandKind::from_name(name)?, command))
        })
    }
}
#[serenity::async_trait]
impl CommandHandler for Handler {
    fn registerable_commands(&self) -> Vec<String> {
        self.enabled_commands()
            .map(|(kind, _)| kind.name().to_string())
            .collect()
    }

    async fn register(&self, http: &Http) -> anyhow::Result<()> {
        for (kind, command) in self.enabled_commands() {
            let mut builder =
                CreateCommand::new(kind.name()).description(command.description.as_str());

            builder = match kind {
                CommandKind::Roll
                | CommandKind::Damage
                | CommandKind::Advantage
                | CommandKind::Disadvantage => builder.add_option(
                    CreateCommandOption::new(
                        CommandOptionType::String,
                        value::EXPRESSION,
                        "Dice notation, e.g. 2d6+3, +5, or 5 1d20+2. Defaults to 1d20.",
                    )
                    .required(false),
                ),
                CommandKind::Stats => builder.add_option(
                    CreateCommandOption::new(
                        CommandOptionType::Integer,
                        value::COUNT,
                        "How many characters to roll.",
                    )
                    .min_int_value(1)
                    .max_int_value(limits::MAX_REPEAT as u64)
                    .required(false),
                ),
                CommandKind::Help => builder,
            };

            Command::create_global_command(http, builder).await?;
        }

        Ok(())
    }

    fn can_handle_command(&self, cmd: &CommandInteraction) -> bool {
        let name = cmd.data.name.as_str();
        CommandKind::from_name(name).is_some()
            && self.commands.get(name).is_some_and(|c| c.enabled)
    }

    async fn run(&self, http: &Http, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let kind = CommandKind::from_name(cmd.data.name.as_str()).context("unknown command")?;
        match kind {
            CommandKind::Roll => self.run_roll(http, cmd).await,
            CommandKind::Damage => self.run_damage(http, cmd).await,
            CommandKind::Advantage => self.run_contest(http, cmd, true).await,
            CommandKind::Disadvantage => self.run_contest(http, cmd, false).await,
            CommandKind::Stats => self.run_stats(http, cmd).await,
            CommandKind::Help => self.run_help(http, cmd).await,
        }
    }
}
impl Handler {
    async fn run_roll(&self, http: &Http, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let (repeat, expr) = notation::parse_request(&expression_argument(cmd))?;

        let mut lines = Vec::new();
        for i in 0..repeat {
            let outcome = roll::roll(&expr);
            if repeat == 1 {
                lines.push(format!("**Result:** {}", outcome.format()));
            } else {
                lines.push(format!("**Roll #{}:**\n{}", i + 1, outcome.format()));
            }
        }

        let title = format!(
            "🎲 Rolling {}{}",
            expr.text().to_uppercase(),
            repeat_suffix(repeat)
        );
        let embed = results_embed(title, color::ROLL, BLANK_FIELD_NAME, &lines, "\n", cmd.user());
        cmd.create_embed(http, embed).await
    }

    async fn run_damage(&self, http: &Http, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let (repeat, expr) = notation::parse_request(&expression_argument(cmd))?;

        let mut lines = Vec::new();
        let mut grand_total = 0;
        for i in 0..repeat {
            let outcome = roll::damage(&expr);
            grand_total += outcome.total;

            if repeat == 1 {
                lines.push(format!("**Result:** {}", outcome.format()));
            } else {
                lines.push(format!("**Roll #{}:**\n{}", i + 1, outcome.format()));
            }
        }
        if repeat > 1 {
            lines.push(format!("\n**Total Damage: {grand_total}**"));
        }

        let title = format!(
            "⚔️ Damage: {}{}",
            expr.text().to_uppercase(),
            repeat_suffix(repeat)
        );
        let embed = results_embed(
            title,
            color::DAMAGE,
            BLANK_FIELD_NAME,
            &lines,
            "\n",
            cmd.user(),
        );
        cmd.create_embed(http, embed).await
    }

    async fn run_contest(
        &self,
        http: &Http,
        cmd: &CommandInteraction,
        keep_higher: bool,
    ) -> anyhow::Result<()> {
        let (repeat, expr) = notation::parse_request(&expression_argument(cmd))?;

        let (contest_fn, kept_word): (fn(&notation::Expression) -> roll::Contest, _) =
            if keep_higher {
                (roll::advantage, "higher")
            } else {
                (roll::disadvantage, "lower")
            };

        let mut lines = Vec::new();
        for i in 0..repeat {
            let contest = contest_fn(&expr);
            if repeat == 1 {
                lines.push(format!(
                    "Roll a: {}\nRoll b: {}\n**Result: {}** ({kept_word})",
                    contest.first.format(),
                    contest.second.format(),
                    contest.total
                ));
            } else {
                lines.push(format!(
                    "**Roll #{}:** {} | {} → {}",
                    i + 1,
                    contest.first.format(),
                    contest.second.format(),
                    contest.total
                ));
            }
        }

        let (emoji, word, colour) = if keep_higher {
            ("🍀", "Advantage", color::ADVANTAGE)
        } else {
            ("💀", "Disadvantage", color::DISADVANTAGE)
        };
        let title = format!(
            "{emoji} {word}: {}{}",
            expr.text().to_uppercase(),
            repeat_suffix(repeat)
        );
        let embed = results_embed(title, colour, BLANK_FIELD_NAME, &lines, "\n", cmd.user());
        cmd.create_embed(http, embed).await
    }

    async fn run_stats(&self, http: &Http, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let count = util::get_value(&cmd.data.options, value::COUNT)
            .and_then(util::value_to_integer)
            .unwrap_or(1);
        let count = notation::validate_repeat(count)?;

        let mut blocks = Vec::new();
        for block in 0..count {
            let scores = roll::ability_scores();
            let mut stat_lines = Vec::new();
            let mut grand_total = 0;

            for (i, score) in scores.iter().enumerate() {
                let lowest = score.lowest_index();
                let shown: Vec<String> = score
                    .rolls
                    .iter()
                    .enumerate()
                    .map(|(j, r)| {
                        if j == lowest {
                            format!("~~{r}~~")
                        } else {
                            r.to_string()
                        }
                    })
                    .collect();
                stat_lines.push(format!(
                    "Stat #{}: ({}) = **{}**",
                    i + 1,
                    shown.join(", "),
                    score.total
                ));
                grand_total += score.total;
            }
            stat_lines.push(format!("\n**Total: {grand_total}**"));

            if count > 1 {
                blocks.push(format!(
                    "__Character #{}__\n{}",
                    block + 1,
                    stat_lines.join("\n")
                ));
            } else {
                blocks.push(stat_lines.join("\n"));
            }
        }

        let title = format!("Character Stats (4d6 Drop Lowest){}", repeat_suffix(count));
        let embed = results_embed(title, color::STATS, "Stats", &blocks, "\n\n", cmd.user());
        cmd.create_embed(http, embed).await
    }

    async fn run_help(&self, http: &Http, cmd: &CommandInteraction) -> anyhow::Result<()> {
        let embed = CreateEmbed::new()
            .title("🎲 Dice Commands")
            .colour(color::HELP)
            .field(
                "/roll [expression]",
                "Modifier applied to each die. Default: `1d20`\n\
                 `/roll` → 1d20\n\
                 `+5` → 1d20+5\n\
                 `10` → 10x 1d20\n\
                 `5 +3` → 5x 1d20+3\n\
                 `2d6+3` → per-die modifier",
                false,
            )
            .field(
                "/damage [expression]",
                "Sum each pool, then add the modifier once\n`1d12+2d6+5`",
                false,
            )
            .field(
                "/advantage, /disadvantage [expression]",
                "Roll twice, keep the higher/lower total (default: 1d20)\n\
                 `+5` → advantage on 1d20+5",
                false,
            )
            .field(
                "/stats [count]",
                "Ability scores: 4d6 drop lowest, six per character",
                false,
            );
        cmd.create_embed(http, embed).await
    }
}

fn expression_argument(cmd: &CommandInteraction) -> String {
    util::get_value(&cmd.data.options, value::EXPRESSION)
        .and_then(util::value_to_string)
        .unwrap_or_default()
}

fn repeat_suffix(repeat: u32) -> String {
    if repeat > 1 {
        format!(" x{repeat}")
    } else {
        String::new()
    }
}

fn results_embed(
    title: String,
    colour: u32,
    field_name: &str,
    lines: &[String],
    separator: &str,
    user: &User,
) -> CreateEmbed {
    let mut embed = CreateEmbed::new().title(title).colour(colour);
    for (i, chunk) in chunk_field_values(lines, separator).into_iter().enumerate() {
        let name = if i == 0 { field_name } else { BLANK_FIELD_NAME };
        embed = embed.field(name, chunk, false);
    }
    embed.footer(CreateEmbedFooter::new(format!(
        "Rolled by {}",
        user.display_name()
    )))
}

/// Joins lines into embed field values, starting a new value whenever the
/// current one would pass the field size limit.
fn chunk_field_values(lines: &[String], separator: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0;

    for line in lines {
        let line_len = line.len() + separator.len();
        if !current.is_empty() && current_len + line_len > limits::EMBED_FIELD_CHUNK {
            chunks.push(current.join(separator));
            current.clear();
            current_len = 0;
        }
        current.push(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current.join(separator));
    }

    chunks
}
