//! E-Computer Store CLI - drive the shopping cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the cart only accepts additions from a signed-in user)
//! estore login --first-name Nimal --last-name Perera --email nimal@example.lk --phone 0771234567
//!
//! # Add a product document as returned by the products API
//! estore cart add '{"productId":"P100","name":"Wireless Mouse","price":1000,"image":["/images/mouse.png"]}'
//!
//! # Inspect and edit the cart
//! estore cart show
//! estore cart set P100 3
//! estore cart remove P100
//!
//! # Print the order payload for the current cart
//! estore checkout --street "12 Galle Road" --city Colombo --state Western --zip 00300
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` - Manage the stored session
//! - `cart` - Show and edit the cart
//! - `checkout` - Build the order payload for the cart
//! - `buy-now` - Build an order payload for a single product

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use estore_storefront::config::StorefrontConfig;
use estore_storefront::notify::TracingNotifier;
use estore_storefront::state::AppState;
use estore_storefront::storage::FileStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

type CliState = AppState<FileStore, TracingNotifier>;

#[derive(Parser)]
#[command(name = "estore")]
#[command(author, version, about = "E-Computer Store cart tools")]
struct Cli {
    /// Directory holding the cart and session (overrides `STOREFRONT_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the signed-in user
    Login {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Forget the signed-in user (the cart is kept)
    Logout,
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Print the order payload for the current cart
    Checkout {
        #[command(flatten)]
        order: OrderArgs,

        /// Empty the cart once the payload has been printed
        #[arg(long)]
        clear_cart: bool,
    },
    /// Print the order payload for a single product, leaving the cart alone
    BuyNow {
        /// Product JSON document
        product: String,

        /// Number of units
        #[arg(short, long, default_value_t = 1)]
        quantity: i64,

        #[command(flatten)]
        order: OrderArgs,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart with totals
    Show {
        /// Print the raw cart lines as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    Add {
        /// Product JSON document
        product: String,
    },
    /// Remove a product
    Remove {
        /// Product ID
        product_id: String,
    },
    /// Set the quantity of a product (below 1 removes it)
    Set {
        /// Product ID
        product_id: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

/// Shipping and payment details for an order.
#[derive(Args)]
struct OrderArgs {
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip: String,
    /// Defaults to Sri Lanka
    #[arg(long)]
    country: Option<String>,
    /// `cash_on_delivery` or `bank_transfer`
    #[arg(long, default_value = "cash_on_delivery")]
    payment: String,
}

fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "estore_storefront=info,estore=info".into());
    let json = std::env::var("ESTORE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        if let Some(hint) = e.downcast_ref::<commands::CliError>().and_then(commands::CliError::hint) {
            tracing::info!("Hint: {hint}");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let store = FileStore::new(config.data_dir.clone());
    let mut state: CliState = AppState::new(config, store, TracingNotifier);

    match cli.command {
        Commands::Login {
            first_name,
            last_name,
            email,
            phone,
        } => commands::session::login(&state, first_name, last_name, &email, phone)?,
        Commands::Logout => commands::session::logout(&state)?,
        Commands::Cart { action } => match action {
            CartAction::Show { json } => commands::cart::show(&state, json)?,
            CartAction::Add { product } => commands::cart::add(&mut state, &product)?,
            CartAction::Remove { product_id } => commands::cart::remove(&mut state, &product_id)?,
            CartAction::Set {
                product_id,
                quantity,
            } => commands::cart::set(&mut state, &product_id, quantity)?,
            CartAction::Clear => commands::cart::clear(&mut state)?,
        },
        Commands::Checkout { order, clear_cart } => {
            commands::checkout::cart(&mut state, &order.into_details(), clear_cart)?;
        }
        Commands::BuyNow {
            product,
            quantity,
            order,
        } => commands::checkout::buy_now(&state, &product, quantity, &order.into_details())?,
    }
    Ok(())
}

impl OrderArgs {
    fn into_details(self) -> commands::checkout::OrderDetails {
        commands::checkout::OrderDetails {
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip,
            country: self.country,
            payment: self.payment,
        }
    }
}
