use aura::{config::StoreConfig, products::ProductId};
use clap::{Args, Subcommand};
use tracing::debug;

use super::{Session, stdout};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart and order summary
    Show,

    /// Add a product to the cart
    Add(AddArgs),

    /// Remove a line from the cart
    Remove(SelectionArgs),

    /// Set the quantity of a line; zero or less removes it
    Update(UpdateArgs),

    /// Empty the cart
    Clear,
}

/// Identifies a cart line.
#[derive(Debug, Args)]
struct SelectionArgs {
    /// Product id
    id: String,

    /// Size or length
    #[arg(long)]
    variant: Option<String>,

    /// Metal option
    #[arg(long)]
    metal: Option<String>,
}

#[derive(Debug, Args)]
struct AddArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// Number of units to add
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[command(flatten)]
    selection: SelectionArgs,

    /// New quantity
    #[arg(allow_negative_numbers = true)]
    quantity: i64,
}

pub(crate) fn run(store: &StoreConfig, command: CartCommand) -> Result<(), String> {
    let mut session = Session::open(store)?;

    match command.command {
        CartSubcommand::Show => {}
        CartSubcommand::Add(args) => add(&mut session, &args)?,
        CartSubcommand::Remove(args) => {
            session.cart.remove_from_cart(
                &ProductId::new(args.id),
                args.variant.as_deref(),
                args.metal.as_deref(),
            );
        }
        CartSubcommand::Update(args) => {
            let quantity = u32::try_from(args.quantity.max(0)).unwrap_or(u32::MAX);

            session
                .cart
                .update_quantity(
                    &ProductId::new(args.selection.id.clone()),
                    quantity,
                    args.selection.variant.as_deref(),
                    args.selection.metal.as_deref(),
                )
                .map_err(|error| format!("failed to update {}: {error}", args.selection.id))?;
        }
        CartSubcommand::Clear => session.cart.clear_cart(),
    }

    session.write_cart(&mut stdout())
}

/// Adds a product, defaulting unspecified selections the way the product page does.
fn add(session: &mut Session, args: &AddArgs) -> Result<(), String> {
    let selection = &args.selection;
    let product = session.product(&selection.id)?;
    let (default_variant, default_metal) = product.default_selection();

    let variant = selection.variant.as_deref().or(default_variant);
    let metal = selection.metal.as_deref().or(default_metal);

    if product.has_variants() {
        match variant {
            Some(label) if product.variant_available(label) => {}
            Some(label) => return Err(format!("{} is not available in {label}", product.name)),
            None => return Err(format!("{} is sold out", product.name)),
        }
    }

    if let Some(metal) = metal
        && !product.metal_options.iter().any(|option| option == metal)
    {
        return Err(format!("{} is not offered in {metal}", product.name));
    }

    let product = product.clone();
    let variant = variant.map(str::to_string);
    let metal = metal.map(str::to_string);

    debug!(product_id = %product.id, ?variant, ?metal, "adding to cart");

    session
        .cart
        .add_to_cart(&product, args.quantity, variant.as_deref(), metal.as_deref())
        .map_err(|error| format!("failed to add {}: {error}", product.name))
}
