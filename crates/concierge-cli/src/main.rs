//! concierge CLI: Investment assistant for tokenized real estate

use clap::{Parser, Subcommand};
use concierge_engine::{Config, Message, QuickAction, TurnController, TurnEvent};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_CONFIG_PATH: &str = ".concierge/config.json";

/// Investment assistant chat with a property details pane
#[derive(Parser)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .concierge/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Append logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Line-oriented chat on stdin/stdout
    Chat {
        /// Print the final transcript as JSON instead of live replies
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so it only logs to a file.
    let stderr_fallback = !matches!(command, Commands::Tui);
    if let Err(e) = setup_tracing(cli.verbose, cli.log_file.as_deref(), stderr_fallback) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    match command {
        Commands::Tui => {
            let config = load_config(&config_path);
            let rt = runtime();
            if let Err(e) = rt.block_on(concierge_tui::run_tui(&config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Chat { json } => {
            let config = load_config(&config_path);
            let rt = runtime();
            if let Err(e) = rt.block_on(cmd_chat(&config, json)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Init { force } => cmd_init(&config_path, force),
    }
}

fn setup_tracing(
    verbose: bool,
    log_file: Option<&Path>,
    stderr_fallback: bool,
) -> std::io::Result<()> {
    use tracing_subscriber::EnvFilter;

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
        tracing::info!(path = %path.display(), "Tracing initialized");
    } else if stderr_fallback {
        // Replies go to stdout; keep stderr quiet unless asked.
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn load_config(path: &Path) -> Config {
    match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_init(config_path: &Path, force: bool) {
    if config_path.exists() && !force {
        println!("Config already exists at {}", config_path.display());
        println!("Use --force to overwrite it");
        return;
    }

    match Config::default().save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Error: failed to write config: {e}");
            std::process::exit(1);
        }
    }
}

/// One line of chat-mode input.
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand {
    /// `/1`..`/4`: pre-fill the input with a quick action.
    Quick(QuickAction),
    /// `/send` or an empty line: submit the pre-filled input.
    Send,
    /// `/clear`: start a new conversation.
    Clear,
    /// `/quit`: leave, cancelling pending replies.
    Quit,
    /// Anything else is sent as a message.
    Say(String),
}

impl ChatCommand {
    fn parse(line: &str) -> Self {
        match line.trim() {
            "" | "/send" => Self::Send,
            "/clear" => Self::Clear,
            "/quit" | "/exit" => Self::Quit,
            trimmed => trimmed
                .strip_prefix('/')
                .and_then(|n| n.parse::<usize>().ok())
                .and_then(|n| n.checked_sub(1))
                .and_then(QuickAction::from_index)
                .map_or_else(|| Self::Say(line.to_string()), Self::Quick),
        }
    }
}

async fn cmd_chat(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut controller = TurnController::from_config(config, None)?;
    let live = !json;

    if live {
        for message in controller.store().messages() {
            print_message(message);
        }
        println!("(/1-/4 quick actions, /send, /clear, /quit)");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ChatCommand::parse(&line) {
                    ChatCommand::Quick(action) => {
                        controller.apply_quick_action(action);
                        if live {
                            println!("> {}", controller.pending_input());
                        }
                    }
                    ChatCommand::Send => {
                        controller.submit();
                    }
                    ChatCommand::Clear => {
                        controller.clear_conversation();
                        if live {
                            for message in controller.store().messages() {
                                print_message(message);
                            }
                        }
                    }
                    ChatCommand::Quit => {
                        quit = true;
                        break;
                    }
                    ChatCommand::Say(text) => {
                        controller.update_pending_input(text);
                        controller.submit();
                    }
                }
            }
            Some(event) = controller.next_event() => {
                if live {
                    print_event(&controller, &event);
                }
            }
        }
    }

    if quit {
        controller.teardown();
    } else {
        // End of input: let scheduled replies land before exiting.
        for event in controller.run_until_idle().await {
            if live {
                print_event(&controller, &event);
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(controller.store().messages())?
        );
    }

    Ok(())
}

fn print_event(controller: &TurnController, event: &TurnEvent) {
    let ids: Vec<_> = match event {
        TurnEvent::ReplyAppended { message_ids, .. } => message_ids.iter().collect(),
        TurnEvent::ReplyFailed { message_id, .. } => vec![message_id],
    };
    for message in controller
        .store()
        .messages()
        .iter()
        .filter(|m| ids.contains(&m.id()))
    {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    println!("{}: {}", message.role(), message.content());
    for action in message.quick_actions() {
        println!("  /{} {}", action.index() + 1, action.label());
    }
}
