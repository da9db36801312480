use crate::{
    commands::{self, CommandHandler},
    config::Configuration,
    util,
};
use serenity::{
    all::{Command, Interaction, Ready},
    async_trait,
    client::{Context, EventHandler},
    http::Http,
};
use std::collections::HashSet;

pub struct Handler {
    commands: Vec<Box<dyn CommandHandler>>,
}
impl Handler {
    pub fn new(config: &Configuration) -> Self {
        Self {
            commands: vec![Box::new(commands::dice::Handler::new(config))],
        }
    }
}
#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        println!("{} is connected; registering commands...", ready.user.name);

        if let Err(err) = register_commands(&ctx.http, &self.commands).await {
            println!("Error while registering commands: `{err}`");
            std::process::exit(1);
        }

        println!("{} is good to go!", ready.user.name);
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let http = &ctx.http;
        if let Interaction::Command(cmd) = interaction {
            if let Some(handler) = self.commands.iter().find(|h| h.can_handle_command(&cmd)) {
                util::run_and_report_error(&cmd, http, handler.run(http, &cmd)).await;
            }
        }
    }
}

async fn register_commands(
    http: &Http,
    handlers: &[Box<dyn CommandHandler>],
) -> anyhow::Result<()> {
    let registered_commands = Command::get_global_commands(http).await?;
    let registered_commands: HashSet<_> = registered_commands
        .iter()
        .map(|c| c.name.clone())
        .collect();

    let our_commands: HashSet<_> = handlers
        .iter()
        .flat_map(|h| h.registerable_commands())
        .collect();

    if registered_commands != our_commands {
        // If the commands registered with Discord don't match the commands configured
        // for this bot, reset them entirely.
        Command::set_global_commands(http, vec![]).await?;
    }

    for handler in handlers {
        handler.register(http).await?;
    }

    Ok(())
}
