//! `parley context`: Print a conversation's relevant context as JSON.

use parley_agent::Assistant;
use parley_core::ConversationId;

pub async fn run(conversation: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let assistant = Assistant::from_config(&config);

    let context = assistant
        .memory()
        .relevant_context(&ConversationId::from(conversation), "")
        .await?;
    println!("{}", serde_json::to_string_pretty(&context)?);

    Ok(())
}
