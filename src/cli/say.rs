//! One-shot "say" command

use std::error::Error;

use crate::core::config::Config;

pub async fn run_say(
    prompt: Vec<String>,
    model: Option<String>,
    vision_model: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.is_empty() {
        eprintln!("Usage: cevap say <prompt>");
        std::process::exit(1);
    }

    let config = Config::load()?;
    let mut orchestrator = super::build_orchestrator(&config, model, vision_model);

    let reply = orchestrator.handle(&prompt, None).await;
    println!("{reply}");

    Ok(())
}
