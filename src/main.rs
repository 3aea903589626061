use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use intake_chat::channels::{CliPresentation, Command};
use intake_chat::config::ConversationConfig;
use intake_chat::intake::{ControllerDeps, ConversationController, SERVICE_CATALOG};
use intake_chat::scheduler::TokioScheduler;
use intake_chat::sink::FormIntakeClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let sink = Arc::new(FormIntakeClient::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export INTAKE_ENDPOINT=https://formspree.io/f/<form-id>");
        std::process::exit(1);
    }));
    let conversation_config = ConversationConfig::from_env();

    eprintln!("Intake Chat v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Endpoint: {}", sink.endpoint());
    eprintln!("   Step delay: {:?}", conversation_config.step_delay);
    if conversation_config.offer_services {
        let ids: Vec<&str> = SERVICE_CATALOG.iter().map(|c| c.id).collect();
        eprintln!("   Services: {}", ids.join(", "));
    } else {
        eprintln!("   Services: not offered");
    }
    eprintln!("   Commands: /skip, /service <id>, /status, /quit\n");

    let presentation = Arc::new(CliPresentation::new());
    let scheduler = Arc::new(TokioScheduler::new());

    let deps = ControllerDeps {
        presentation: presentation.clone(),
        sink,
        scheduler: scheduler.clone(),
    };
    let Some(mut controller) = ConversationController::mount(conversation_config, deps) else {
        anyhow::bail!("chat widget controls unavailable");
    };

    // The terminal input has focus from the start.
    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !controller.is_complete() {
        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        match Command::parse(&line) {
            Command::Text(text) => {
                if !presentation.input_enabled() && !text.is_empty() {
                    eprintln!("  (choose a service with /service <id>)");
                }
                controller.submit_input(&text);
            }
            Command::Skip => controller.skip(),
            Command::Service(id) => controller.select_category(&id),
            Command::Status => {
                eprintln!("{}", serde_json::to_string_pretty(&controller.status())?);
            }
            Command::Quit => break,
        }
    }

    // Let the closing message and the submission finish.
    scheduler.drain().await;
    Ok(())
}
