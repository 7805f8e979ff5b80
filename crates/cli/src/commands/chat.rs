//! `loupe chat`: interactive or single-message chat mode.

use loupe_agent::AgentLoop;
use loupe_config::AppConfig;
use loupe_core::event::InspectionEvent;
use loupe_inspection::{InspectionHub, Topic};
use loupe_providers::OpenAiCompatProvider;
use std::io::Write;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinHandle;

pub async fn run(message: Option<String>, trace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY=sk-or-v1-...   (recommended)");
        eprintln!("    LOUPE_API_KEY=sk-...              (any OpenAI-compatible endpoint)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let tools = Arc::new(loupe_tools::default_registry());
    let hub = Arc::new(InspectionHub::new(config.inspection.queue_capacity));
    let agent = AgentLoop::from_config(&config, provider, tools, hub.clone());

    let printer = trace.then(|| spawn_trace_printer(&hub));

    if let Some(msg) = message {
        let response = agent.run(&msg).await?;
        finish_trace(agent, hub, printer).await;
        println!("{response}");
        return Ok(());
    }

    println!();
    println!("  Loupe, interactive mode");
    println!();
    println!("  Model:  {}", config.model);
    println!("  Tools:  {}", agent.session().tools().names().join(", "));
    println!("  Trace:  {}", if trace { "on (stderr)" } else { "off" });
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/clear' to reset the conversation, 'exit' to quit.");
    println!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/clear" => {
                agent.clear().await;
                println!("  (context cleared)");
            }
            _ => match agent.run(input).await {
                Ok(response) => {
                    println!();
                    for line in response.lines() {
                        println!("  Assistant > {line}");
                    }
                    println!();
                }
                Err(e) => {
                    eprintln!("  [Error] {e}");
                    println!();
                }
            },
        }
        prompt()?;
    }

    finish_trace(agent, hub, printer).await;
    println!();
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Print every inspection frame to stderr until the hub goes away.
fn spawn_trace_printer(hub: &Arc<InspectionHub>) -> JoinHandle<()> {
    let mut observer = hub.attach(Topic::Inspection);
    tokio::spawn(async move {
        while let Some(frame) = observer.recv().await {
            eprintln!("{}", render_frame(&frame));
        }
    })
}

/// Drop every handle on the hub so the printer drains its queue and exits.
async fn finish_trace(agent: AgentLoop, hub: Arc<InspectionHub>, printer: Option<JoinHandle<()>>) {
    drop(agent);
    drop(hub);
    if let Some(printer) = printer {
        let _ = printer.await;
    }
}

/// Pretty-print trace records; log lines pass through as-is.
fn render_frame(frame: &str) -> String {
    match serde_json::from_str::<InspectionEvent>(frame) {
        Ok(event @ InspectionEvent::Trace { .. }) => {
            format!("  · {}", event.to_text().replace('\n', "\n      "))
        }
        _ => format!("  · {frame}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_core::event::TraceLabel;

    #[test]
    fn plain_log_frame_passes_through() {
        assert_eq!(
            render_frame("Requested tools: getWeather"),
            "  · Requested tools: getWeather"
        );
    }

    #[test]
    fn multi_line_log_kept() {
        assert_eq!(render_frame("a\nb"), "  · a\nb");
    }

    #[test]
    fn trace_frame_rendered_as_text() {
        let event = InspectionEvent::trace("Final answer").with_child(TraceLabel::Content, "done");
        let frame = serde_json::to_string(&event).unwrap();
        assert_eq!(render_frame(&frame), "  · Final answer\n      [Content] done");
    }

    #[test]
    fn non_trace_json_printed_verbatim() {
        assert_eq!(render_frame(r#"{"message":"hi"}"#), r#"  · {"message":"hi"}"#);
    }
}
