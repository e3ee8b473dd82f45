//! Food Delivery CLI - order food from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the password can also come from FOOD_PASSWORD)
//! food login -e ada@example.com
//!
//! # Browse and fill the cart
//! food restaurants list --cuisine Italian
//! food restaurants show 1
//! food cart add 1 2
//!
//! # Place the order
//! food checkout --address-id 4 --phone 5551234567 --payment cash
//! food orders list
//! ```
//!
//! # Commands
//!
//! - `health` - Check the backend
//! - `login`, `register`, `logout`, `whoami`, `profile update` - Account
//! - `restaurants list|show|reviews|review` - Browse restaurants
//! - `cart show|add|set|remove|clear` - Manage the cart
//! - `checkout` - Place an order from the cart
//! - `orders list|show|cancel` - Order history
//! - `addresses list|add|update|remove|default` - Saved addresses

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use food_delivery_core::{AddressId, MenuItemId, OrderId, RestaurantId};
use food_delivery_storefront::api::RestaurantSort;
use food_delivery_storefront::{AppError, Storefront, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod output;

use commands::addresses::AddressArgs;
use commands::checkout::CheckoutArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "food")]
#[command(author, version, about = "Order food from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Sign in
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "FOOD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email
        #[arg(short, long)]
        email: String,

        /// 10-digit phone number
        #[arg(long)]
        phone: String,

        /// Account password
        #[arg(short, long, env = "FOOD_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Manage the profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse restaurants
    Restaurants {
        #[command(subcommand)]
        action: RestaurantAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place an order from the cart
    Checkout(CheckoutArgs),
    /// Order history
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Saved delivery addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
}

impl Commands {
    /// Whether the saved session is restored before running.
    const fn needs_session(&self) -> bool {
        !matches!(self, Self::Health)
    }
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Change name, email or phone
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum RestaurantAction {
    /// List restaurants
    List {
        /// Name or cuisine to search for
        #[arg(short, long)]
        search: Option<String>,

        /// Only this cuisine
        #[arg(short, long)]
        cuisine: Option<String>,

        /// Sort order (`rating`, `delivery_time`, `name`)
        #[arg(long)]
        sort: Option<RestaurantSort>,

        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show a restaurant with its menu and reviews
    Show { id: RestaurantId },
    /// List a restaurant's reviews
    Reviews { id: RestaurantId },
    /// Review a restaurant
    Review {
        id: RestaurantId,

        /// Stars, 1 to 5
        #[arg(short, long)]
        rating: u8,

        #[arg(short, long, default_value = "")]
        comment: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit of a dish
    Add {
        restaurant: RestaurantId,
        item: MenuItemId,
    },
    /// Set a line's quantity; zero or less removes it
    Set {
        item: MenuItemId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { item: MenuItemId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// List past orders
    List,
    /// Show one order with its progress
    Show { id: OrderId },
    /// Cancel an order that has not been delivered
    Cancel { id: OrderId },
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add(AddressArgs),
    /// Replace a saved address
    Update {
        id: AddressId,
        #[command(flatten)]
        address: AddressArgs,
    },
    /// Delete a saved address
    Remove { id: AddressId },
    /// Make an address the default
    Default { id: AddressId },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::failure(&CliError::from(e));
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "food_delivery_storefront=info,food_delivery_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            output::failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), CliError> {
    let storefront = Storefront::from_config(config).map_err(AppError::from)?;

    if cli.command.needs_session() {
        storefront.start().await;
    }

    match cli.command {
        Commands::Health => commands::health::check(&storefront).await?,
        Commands::Login { email, password } => {
            commands::account::login(&storefront, email, password.into()).await?;
        }
        Commands::Register {
            name,
            email,
            phone,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            commands::account::register(
                &storefront,
                commands::account::Registration {
                    name,
                    email,
                    phone,
                    password: password.into(),
                    confirm_password: confirm_password.into(),
                },
            )
            .await?;
        }
        Commands::Logout => commands::account::logout(&storefront).await,
        Commands::Whoami => commands::account::whoami(&storefront)?,
        Commands::Profile {
            action: ProfileAction::Update { name, email, phone },
        } => commands::account::update_profile(&storefront, name, email, phone).await?,
        Commands::Restaurants { action } => match action {
            RestaurantAction::List {
                search,
                cuisine,
                sort,
                page,
            } => commands::restaurants::list(&storefront, search, cuisine, sort, page).await,
            RestaurantAction::Show { id } => commands::restaurants::show(&storefront, id).await?,
            RestaurantAction::Reviews { id } => {
                commands::restaurants::reviews(&storefront, id).await?;
            }
            RestaurantAction::Review {
                id,
                rating,
                comment,
            } => commands::restaurants::review(&storefront, id, rating, &comment).await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront).await?,
            CartAction::Add { restaurant, item } => {
                commands::cart::add(&storefront, restaurant, item).await?;
            }
            CartAction::Set { item, quantity } => {
                commands::cart::set(&storefront, item, quantity).await?;
            }
            CartAction::Remove { item } => commands::cart::remove(&storefront, item).await?,
            CartAction::Clear => commands::cart::clear(&storefront).await?,
        },
        Commands::Checkout(args) => commands::checkout::run(&storefront, args).await?,
        Commands::Orders { action } => match action {
            OrderAction::List => commands::orders::list(&storefront).await?,
            OrderAction::Show { id } => commands::orders::show(&storefront, id).await?,
            OrderAction::Cancel { id } => commands::orders::cancel(&storefront, id).await?,
        },
        Commands::Addresses { action } => match action {
            AddressAction::List => commands::addresses::list(&storefront).await?,
            AddressAction::Add(address) => commands::addresses::add(&storefront, address).await?,
            AddressAction::Update { id, address } => {
                commands::addresses::update(&storefront, id, address).await?;
            }
            AddressAction::Remove { id } => commands::addresses::remove(&storefront, id).await?,
            AddressAction::Default { id } => {
                commands::addresses::set_default(&storefront, id).await?;
            }
        },
    }
    Ok(())
}
