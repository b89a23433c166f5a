//! Terminal chat client
//!
//! Runs either the customer widget or the operator console against a
//! Conversation Store. Lines typed at the prompt are sent as messages;
//! lines starting with `/` are commands.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use supportdesk::client::notify::{NotificationEmitter, TerminalHost};
use supportdesk::client::session::SessionStore;
use supportdesk::client::{ClientError, Config, CustomerWidget, HttpStore, OperatorConsole};
use supportdesk::shared::messaging::ChatMessage;
use supportdesk::shared::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "support-chat", about = "Storefront support chat")]
struct Cli {
    #[arg(long, env = "SUPPORT_STORE_URL", help = "Conversation Store endpoint")]
    store_url: Option<String>,

    #[arg(long, env = "SUPPORT_POLL_SECS", help = "Seconds between sync ticks")]
    poll_secs: Option<u64>,

    #[arg(long, value_name = "DIR", help = "Directory for session files")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Chat with support as a customer
    Customer {
        #[arg(long, help = "Email to register with (reuses the saved session if omitted)")]
        email: Option<String>,
    },
    /// Answer customers from the operator console
    Operator {
        #[arg(long, env = "SUPPORT_OPERATOR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&env_filter))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let app = config.app().clone();
    let sessions = cli
        .session_dir
        .clone()
        .map(SessionStore::at)
        .unwrap_or_default();
    let notifier = Arc::new(NotificationEmitter::new(
        Arc::new(TerminalHost),
        app.default_title.clone(),
    ));
    notifier.init();
    let store = Arc::new(HttpStore::new(config)?);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    match cli.role {
        Role::Customer { email } => {
            let widget = CustomerWidget::new(store, sessions, notifier, app);
            run_customer(widget, email, &mut input).await
        }
        Role::Operator { password } => {
            let console = OperatorConsole::new(store, sessions, notifier, app);
            run_operator(console, password, &mut input).await
        }
    }
}

fn build_config(cli: &Cli) -> Result<Config, ClientError> {
    let url = match &cli.store_url {
        Some(url) => url.clone(),
        None => Config::new().store_url().to_string(),
    };
    let mut builder = AppConfig::builder().store_url(url);
    if let Some(secs) = cli.poll_secs {
        builder = builder.poll_interval(Duration::from_secs(secs));
    }
    Ok(Config::with_builder(builder)?)
}

async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    eprint!("{}: ", label);
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

fn print_message(message: &ChatMessage) {
    let who = if message.sender.is_operator() { "support" } else { "customer" };
    let body = if message.has_image() {
        format!("{} [image]", message.text)
    } else {
        message.text.clone()
    };
    println!("{} {:>8}: {}", message.timestamp.format("%H:%M"), who, body);
}

/// Print messages newer than `last_seen`; returns the new high-water mark
fn print_new(messages: &[ChatMessage], last_seen: u64) -> u64 {
    let mut last = last_seen;
    for message in messages.iter().filter(|m| m.id > last_seen) {
        print_message(message);
        last = last.max(message.id);
    }
    // A cleared thread starts over
    if messages.is_empty() {
        0
    } else {
        last
    }
}

fn report(err: &ClientError) {
    eprintln!("[error] {}", err.user_message());
}

/// Drop composer errors that were already shown as a toast
fn untoasted<T>(result: Result<T, ClientError>) -> Result<(), ClientError> {
    match result {
        Err(e) if e.is_toasted() => Ok(()),
        other => other.map(|_| ()),
    }
}

async fn run_customer(
    mut widget: CustomerWidget,
    email: Option<String>,
    input: &mut Input,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(email) = email {
        widget.register(&email).await?;
    }
    while widget.session().is_none() {
        let Some(email) = prompt(input, "Email").await? else {
            return Ok(());
        };
        if let Err(e) = widget.register(&email).await {
            report(&e);
        }
    }

    let widget = Arc::new(widget);
    widget.open()?;
    if let Some(session) = widget.session() {
        eprintln!("Chatting as {}. /image <files...> sends pictures, /quit leaves.", session.email);
    }

    let printer = {
        let widget = Arc::clone(&widget);
        tokio::spawn(async move {
            let mut last_seen = 0;
            loop {
                last_seen = print_new(&widget.messages(), last_seen);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        })
    };

    while let Some(line) = input.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let result = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/image", files) => untoasted(
                widget
                    .send_images(&files.split_whitespace().map(PathBuf::from).collect::<Vec<_>>())
                    .await,
            ),
            _ => untoasted(widget.send_text(line).await),
        };
        if let Err(e) = result {
            report(&e);
        }
    }

    printer.abort();
    widget.close();
    Ok(())
}

async fn run_operator(
    mut console: OperatorConsole,
    password: Option<String>,
    input: &mut Input,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(password) = password {
        console.login(&password).await?;
    }
    while !console.is_authenticated() {
        let Some(password) = prompt(input, "Operator password").await? else {
            return Ok(());
        };
        if let Err(e) = console.login(&password).await {
            report(&e);
        }
    }
    console.open()?;
    eprintln!("Commands: /list, /open <id>, /close, /clear <id>, /image <files...>, /quit");

    let console = Arc::new(Mutex::new(console));
    let printer = {
        let console = Arc::clone(&console);
        tokio::spawn(async move {
            let mut last_seen = 0;
            let mut selected = None;
            loop {
                {
                    let console = console.lock().await;
                    if console.selected() != selected {
                        selected = console.selected();
                        last_seen = 0;
                    }
                    last_seen = print_new(&console.messages(), last_seen);
                }
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        })
    };

    while let Some(line) = input.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let result = match command {
            "/quit" => break,
            "/list" => {
                let console = console.lock().await;
                for c in console.conversations() {
                    let unread = console.unread_for(c.id);
                    println!(
                        "#{:<5} {:<32} {:>4} msgs{}",
                        c.id,
                        c.email,
                        c.message_count,
                        if unread > 0 { format!("  ({} new)", unread) } else { String::new() }
                    );
                }
                Ok(())
            }
            "/open" => match rest.trim().parse::<u64>() {
                Ok(id) => console.lock().await.select(id),
                Err(_) => Err(ClientError::validation("id", "Usage: /open <id>")),
            },
            "/close" => {
                console.lock().await.deselect();
                Ok(())
            }
            "/clear" => match rest.trim().parse::<u64>() {
                Ok(id) => {
                    let answer = prompt(input, "Clear all messages? [y/N]").await?;
                    let confirmed = matches!(answer.as_deref(), Some("y") | Some("Y") | Some("yes"));
                    untoasted(
                        console
                            .lock()
                            .await
                            .clear_conversation(id, &move |_: &str| confirmed)
                            .await,
                    )
                }
                Err(_) => Err(ClientError::validation("id", "Usage: /clear <id>")),
            },
            "/image" => {
                let files: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                untoasted(console.lock().await.send_images(&files).await)
            }
            _ => untoasted(console.lock().await.send_text(&line).await),
        };
        if let Err(e) = result {
            report(&e);
        }
        if !console.lock().await.is_authenticated() {
            eprintln!("Operator session expired; sign in again.");
            break;
        }
    }

    printer.abort();
    console.lock().await.close();
    Ok(())
}
