use serenity::{all::*, async_trait};
use std::future::Future;

pub fn get_value<'a>(
    options: &'a [CommandDataOption],
    name: &'a str,
) -> Option<&'a CommandDataOptionValue> {
    options.iter().find(|v| v.name == name).map(|v| &v.value)
}

pub fn value_to_string(v: &CommandDataOptionValue) -> Option<String> {
    match v {
        CommandDataOptionValue::String(v) => Some(v.clone()),
        _ => None,
    }
}

pub fn value_to_integer(v: &CommandDataOptionValue) -> Option<i64> {
    match v {
        CommandDataOptionValue::Integer(v) => Some(*v),
        _ => None,
    }
}

/// The subset of interaction responses the command handlers need.
#[async_trait]
pub trait RespondableInteraction: Send + Sync {
    async fn create(&self, http: &Http, message: &str) -> anyhow::Result<()>;
    async fn create_embed(&self, http: &Http, embed: CreateEmbed) -> anyhow::Result<()>;
    async fn get_interaction_message(&self, http: &Http) -> anyhow::Result<Message>;
    async fn create_or_edit(&self, http: &Http, message: &str) -> anyhow::Result<()>;

    fn user(&self) -> &User;
}

#[async_trait]
impl RespondableInteraction for CommandInteraction {
    async fn create(&self, http: &Http, msg: &str) -> anyhow::Result<()> {
        Ok(self
            .create_response(
                http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content(msg),
                ),
            )
            .await?)
    }
    async fn create_embed(&self, http: &Http, embed: CreateEmbed) -> anyhow::Result<()> {
        Ok(self
            .create_response(
                http,
                CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().embed(embed),
                ),
            )
            .await?)
    }
    async fn get_interaction_message(&self, http: &Http) -> anyhow::Result<Message> {
        Ok(self.get_response(http).await?)
    }
    async fn create_or_edit(&self, http: &Http, message: &str) -> anyhow::Result<()> {
        Ok(
            if let Ok(mut msg) = self.get_interaction_message(http).await {
                msg.edit(http, EditMessage::new().content(message)).await?;
            } else {
                self.create(http, message).await?;
            },
        )
    }

    fn user(&self) -> &User {
        &self.user
    }
}

/// Runs the [body] and responds to the interaction with the error, if any.
pub async fn run_and_report_error(
    interaction: &dyn RespondableInteraction,
    http: &Http,
    body: impl Future<Output = anyhow::Result<()>>,
) {
    if let Err(err) = body.await {
        if let Err(report_err) = interaction
            .create_or_edit(http, &format!("Error: {err}"))
            .await
        {
            eprintln!("Failed to report error to Discord: {report_err:?}");
        }
    }
}
