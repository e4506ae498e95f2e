//! Invoicedesk CLI
//!
//! Command-line front end for the back-office API:
//! - List, create, update and delete products
//! - List, create, update and delete invoices
//! - Chat with the assistant
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use invoicedesk::chat::{
    ChatTransport, ChatUpdate, ChatView, CloseReason, Sender, WebSocketTransport,
};
use invoicedesk::config::{self, ChatConfig, Config};
use invoicedesk::controller::{
    Confirm, InvoicesController, Outcome, ProductsController, ResourceController,
};
use invoicedesk::notify::Notification;
use invoicedesk::resources::{Invoice, LineItemForm, Product, ResourceForm, ResourceId};
use invoicedesk::{logging, ApiClient, ResourceApi};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "invoicedesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage products and invoices, and chat with the assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductCommand,
    },

    /// Manage invoices
    Invoices {
        #[command(subcommand)]
        action: InvoiceCommand,
    },

    /// Chat with the assistant. Type /quit to leave.
    Chat {
        /// Chat endpoint, overrides the config file
        #[arg(long)]
        url: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ProductCommand {
    /// List all products
    List,

    /// Create a product
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: String,
    },

    /// Update a product; omitted fields keep their current value
    Update {
        id: ResourceId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        price: Option<String>,
    },

    /// Delete a product
    Delete {
        id: ResourceId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum InvoiceCommand {
    /// List all invoices
    List,

    /// Create an invoice
    Create {
        #[arg(long, default_value = "")]
        customer: String,
        /// Line item as NAME=PRICE, repeatable
        #[arg(short, long = "item")]
        items: Vec<String>,
    },

    /// Update an invoice; given items replace all current lines
    Update {
        id: ResourceId,
        #[arg(long)]
        customer: Option<String>,
        /// Line item as NAME=PRICE, repeatable
        #[arg(short, long = "item")]
        items: Vec<String>,
    },

    /// Delete an invoice
    Delete {
        id: ResourceId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Confirmation read from the terminal
struct Prompt {
    assume_yes: bool,
}

impl Confirm for Prompt {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        match ask(prompt, &mut std::io::stdin().lock(), &mut std::io::stderr()) {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation");
                false
            }
        }
    }
}

/// Write a yes/no question and read the answer. EOF counts as no.
fn ask(
    prompt: &str,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> std::io::Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Ok(false);
    }
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut config, ignored) = match &cli.config {
        Some(path) => (Config::load_with_env(path)?, Vec::new()),
        None => Config::discover(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    logging::init(&config.logging);
    for e in ignored {
        tracing::warn!(error = %e, "Ignoring config file");
    }

    let outcome = match cli.command {
        Commands::Products { action } => {
            let client = ApiClient::new(&config.api)?;
            run_products(ProductsController::new(client), action, cli.format).await?
        }

        Commands::Invoices { action } => {
            let client = ApiClient::new(&config.api)?;
            run_invoices(InvoicesController::new(client), action, cli.format).await?
        }

        Commands::Chat { url } => {
            let mut chat = config.chat.clone();
            if let Some(url) = url {
                chat.url = url;
            }
            run_chat(&chat).await?
        }

        Commands::Config { output } => {
            let generated = config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &generated)
                        .with_context(|| format!("writing {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", generated);
                }
            }
            Outcome::Succeeded
        }
    };

    match outcome {
        Outcome::Succeeded | Outcome::Cancelled => Ok(()),
        Outcome::Failed | Outcome::Rejected => std::process::exit(1),
    }
}

async fn run_products<A>(
    mut products: ProductsController<A>,
    action: ProductCommand,
    format: OutputFormat,
) -> anyhow::Result<Outcome>
where
    A: ResourceApi<Product>,
{
    let outcome = match action {
        ProductCommand::List => {
            let outcome = products.refresh().await;
            if outcome == Outcome::Succeeded {
                print_products(products.items(), format)?;
            }
            outcome
        }

        ProductCommand::Create { name, price } => {
            let form = products.form_mut();
            form.name = name;
            form.price = price;
            products.submit().await
        }

        ProductCommand::Update { id, name, price } => {
            match start_edit(&mut products, &id).await {
                Outcome::Succeeded => {
                    let form = products.form_mut();
                    if let Some(name) = name {
                        form.name = name;
                    }
                    if let Some(price) = price {
                        form.price = price;
                    }
                    products.submit().await
                }
                other => other,
            }
        }

        ProductCommand::Delete { id, yes } => {
            products.delete(&id, &Prompt { assume_yes: yes }).await
        }
    };

    report(products.take_notifications());
    Ok(outcome)
}

async fn run_invoices<A>(
    mut invoices: InvoicesController<A>,
    action: InvoiceCommand,
    format: OutputFormat,
) -> anyhow::Result<Outcome>
where
    A: ResourceApi<Invoice>,
{
    let outcome = match action {
        InvoiceCommand::List => {
            let outcome = invoices.refresh().await;
            if outcome == Outcome::Succeeded {
                print_invoices(invoices.items(), format)?;
            }
            outcome
        }

        InvoiceCommand::Create { customer, items } => {
            let lines = parse_items(&items)?;
            let form = invoices.form_mut();
            form.customer = customer;
            form.set_lines(lines);
            invoices.submit().await
        }

        InvoiceCommand::Update {
            id,
            customer,
            items,
        } => {
            let lines = parse_items(&items)?;
            match start_edit(&mut invoices, &id).await {
                Outcome::Succeeded => {
                    let form = invoices.form_mut();
                    if let Some(customer) = customer {
                        form.customer = customer;
                    }
                    if !lines.is_empty() {
                        form.set_lines(lines);
                    }
                    invoices.submit().await
                }
                other => other,
            }
        }

        InvoiceCommand::Delete { id, yes } => {
            invoices.delete(&id, &Prompt { assume_yes: yes }).await
        }
    };

    report(invoices.take_notifications());
    Ok(outcome)
}

/// Load the list and put the controller in edit mode for `id`
async fn start_edit<F, A>(controller: &mut ResourceController<F, A>, id: &ResourceId) -> Outcome
where
    F: ResourceForm,
    A: ResourceApi<F::Resource>,
{
    let outcome = controller.refresh().await;
    if outcome != Outcome::Succeeded {
        return outcome;
    }
    if controller.edit(id) {
        Outcome::Succeeded
    } else {
        eprintln!("No entry with id {}", id);
        Outcome::Failed
    }
}

/// Parse `NAME=PRICE` arguments into form lines
///
/// The price is kept as text so the form reports invalid numbers.
fn parse_items(items: &[String]) -> anyhow::Result<Vec<LineItemForm>> {
    items
        .iter()
        .map(|item| {
            item.rsplit_once('=')
                .map(|(name, price)| LineItemForm::new(name, price))
                .with_context(|| format!("Invalid item '{}'. Use NAME=PRICE", item))
        })
        .collect()
}

async fn run_chat(config: &ChatConfig) -> anyhow::Result<Outcome> {
    let mut view = ChatView::<WebSocketTransport>::mount(config).await;
    report(view.take_notifications());
    if view.connection().is_closed() {
        return Ok(Outcome::Failed);
    }

    eprintln!("Connected to {}. Type /quit to leave.", config.url);
    chat_session(view, BufReader::new(tokio::io::stdin())).await
}

/// Relay input lines to the chat until `/quit`, EOF or the channel closes.
///
/// The view is always unmounted before returning, including when reading
/// input fails.
async fn chat_session<T, R>(mut view: ChatView<T>, input: R) -> anyhow::Result<Outcome>
where
    T: ChatTransport,
    R: AsyncBufRead + Unpin,
{
    enum Action {
        Send(String),
        Update(Option<ChatUpdate>),
        InputFailed(std::io::Error),
        Quit,
    }

    let mut lines = input.lines();
    let mut result = Ok(Outcome::Succeeded);

    loop {
        let action = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) if line.trim() == "/quit" => Action::Quit,
                Ok(Some(line)) => Action::Send(line),
                Ok(None) => Action::Quit,
                Err(e) => Action::InputFailed(e),
            },
            update = view.next_update() => Action::Update(update),
        };

        match action {
            Action::Send(line) => {
                if let Err(e) = view.send(&line).await {
                    tracing::debug!(error = %e, "Send rejected");
                }
            }
            Action::Update(Some(ChatUpdate::Message(message))) => {
                println!("{}: {}", label(message.sender), message.text);
            }
            Action::Update(Some(ChatUpdate::Dropped(_))) => {}
            Action::Update(Some(ChatUpdate::Closed(reason))) => {
                report(view.take_notifications());
                if let CloseReason::Error(_) = reason {
                    result = Ok(Outcome::Failed);
                }
                eprintln!("Chat closed.");
                break;
            }
            Action::InputFailed(e) => {
                result = Err(anyhow::Error::new(e).context("reading chat input"));
                break;
            }
            Action::Update(None) | Action::Quit => break,
        }

        report(view.take_notifications());
        if view.connection().is_closed() {
            result = Ok(Outcome::Failed);
            break;
        }
    }

    view.unmount().await;
    result
}

fn label(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "You",
        Sender::Bot => "Bot",
    }
}

/// Print notifications to stderr
fn report(notifications: Vec<Notification>) {
    for note in notifications {
        eprintln!("{}", note);
    }
}

fn print_products(products: &[Product], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(products)?);
        return Ok(());
    }

    if products.is_empty() {
        println!("No products yet.");
        println!();
        println!("Create your first product with:");
        println!("  invoicedesk products create --name Laptop --price 1000");
        return Ok(());
    }

    println!("{:<10} {:<30} {:>12}", "ID", "Name", "Price");
    println!("{}", "-".repeat(54));

    for product in products {
        println!(
            "{:<10} {:<30} {:>12}",
            product.id.to_string(),
            product.name,
            format!("${:.2}", product.price)
        );
    }
    Ok(())
}

fn print_invoices(invoices: &[Invoice], format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(invoices)?);
        return Ok(());
    }

    if invoices.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }

    println!("{:<10} {:<20} {:>12}  {}", "ID", "Customer", "Total", "Items");
    println!("{}", "-".repeat(70));

    for invoice in invoices {
        println!(
            "{:<10} {:<20} {:>12}  {}",
            invoice.id.to_string(),
            invoice.customer_label(),
            format!("${:.2}", invoice.total()),
            invoice.summary()
        );
    }
    Ok(())
}
