//! `parley chat`: Interactive or single-message chat mode.

use std::io::Write;

use parley_agent::Assistant;
use parley_config::AppConfig;
use parley_core::{ConversationId, ModelResponse};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>, conversation: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    // Check for API keys early: give a clear error
    if config.keyed_providers().is_empty() {
        eprintln!();
        eprintln!("  ERROR: No provider API key configured!");
        eprintln!();
        eprintln!("  Set at least one of these environment variables:");
        eprintln!("    OPENAI_API_KEY, ANTHROPIC_API_KEY, GEMINI_API_KEY, DEEPSEEK_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let assistant = Assistant::from_config(&config);
    let id = ConversationId::from(conversation.as_str());

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let response = assistant.handle(&id, &msg, None).await?;
        eprint!("\r              \r");
        print_response(&response);
        return Ok(());
    }

    println!();
    println!("  Parley: Interactive Mode");
    println!();
    println!("  Conversation: {id}");
    println!("  Providers:    {}", config.keyed_providers().join(", "));
    println!("  Summarizer:   {}", config.summarizer.provider);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }
        if !text.is_empty() {
            eprint!("  ...");
            match assistant.handle(&id, text, None).await {
                Ok(response) => {
                    eprint!("\r     \r");
                    println!();
                    print_response(&response);
                    println!();
                }
                Err(e) => {
                    eprint!("\r     \r");
                    eprintln!("  [Error] {e}");
                    println!();
                }
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

fn print_response(response: &ModelResponse) {
    for line in response.text.lines() {
        println!("  Assistant > {line}");
    }
    let mut footer = format!(
        "  [{} · {} · {} · ~{} tokens",
        response.provider_id, response.model_id, response.category, response.token_estimate.total
    );
    if let Some(ref from) = response.fallback_from {
        footer.push_str(&format!(" · fallback from {from}"));
    }
    footer.push(']');
    eprintln!("{footer}");
}
