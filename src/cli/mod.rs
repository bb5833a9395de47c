use std::io::{self, Write};

use aura::{
    cart::CartStore,
    catalog::Catalog,
    config::{CartConfig, LoggingConfig, StoreConfig},
    observability::init_subscriber,
    pricing::OrderSummary,
    products::{Product, ProductId},
    receipt::write_cart,
    storage::FileStorage,
};
use clap::{Parser, Subcommand};

mod cart;
mod checkout;
mod products;

#[derive(Debug, Parser)]
#[command(name = "aura", about = "Aura Jewels storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(flatten)]
    store: StoreConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List catalog products
    Products(products::ListProductsArgs),

    /// List the materials, gemstones and price ranges products can be filtered by
    Filters,

    /// Show a single product
    Product(products::ShowProductArgs),

    /// Inspect and change the cart
    Cart(cart::CartCommand),

    /// Place an order for the cart
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        let Self {
            logging,
            store,
            command,
        } = self;

        init_subscriber(&logging).map_err(|error| format!("failed to initialise logging: {error}"))?;

        match command {
            Commands::Products(args) => products::list(&store, &args),
            Commands::Filters => products::filters(&store),
            Commands::Product(args) => products::show(&store, &args),
            Commands::Cart(command) => cart::run(&store, command),
            Commands::Checkout(args) => checkout::run(&store, args),
        }
    }
}

/// Catalog, cart and settings for one command invocation.
struct Session {
    config: CartConfig,
    catalog: Catalog,
    cart: CartStore<FileStorage>,
}

impl Session {
    fn open(store: &StoreConfig) -> Result<Self, String> {
        let config = store.cart_config();
        let catalog = load_catalog(store, &config)?;
        let cart = CartStore::hydrate(FileStorage::new(&store.data_dir), &config);

        Ok(Self {
            config,
            catalog,
            cart,
        })
    }

    fn product(&self, id: &str) -> Result<&Product, String> {
        self.catalog
            .get(&ProductId::new(id))
            .ok_or_else(|| format!("product not found: {id}"))
    }

    fn write_cart(&self, out: &mut impl Write) -> Result<(), String> {
        let summary = OrderSummary::calculate(self.cart.state(), &self.config.pricing)
            .map_err(|error| format!("failed to price cart: {error}"))?;

        write_cart(out, self.cart.state(), &summary)
            .map_err(|error| format!("failed to write cart: {error}"))
    }
}

fn load_catalog(store: &StoreConfig, config: &CartConfig) -> Result<Catalog, String> {
    Catalog::load(&store.catalog, config.currency).map_err(|error| {
        format!(
            "failed to load catalog {}: {error}",
            store.catalog.display()
        )
    })
}

fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}

fn write_err(error: io::Error) -> String {
    format!("failed to write output: {error}")
}
