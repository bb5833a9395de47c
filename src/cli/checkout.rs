use aura::{
    checkout::{CheckoutDetails, DEFAULT_COUNTRY, PaymentMethod, checkout},
    config::StoreConfig,
    receipt::write_confirmation,
};
use clap::Args;

use super::{Session, stdout};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Confirmation email address
    #[arg(long)]
    email: String,

    /// First name
    #[arg(long)]
    first_name: String,

    /// Last name
    #[arg(long)]
    last_name: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// State or region
    #[arg(long)]
    state: String,

    /// Postal code
    #[arg(long)]
    zip: String,

    /// Country
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,

    /// Payment method
    #[arg(long, value_enum, default_value_t = PaymentMethod::CreditCard)]
    payment: PaymentMethod,
}

impl From<CheckoutArgs> for CheckoutDetails {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            city: args.city,
            state: args.state,
            zip: args.zip,
            country: args.country,
            payment_method: args.payment,
        }
    }
}

pub(crate) fn run(store: &StoreConfig, args: CheckoutArgs) -> Result<(), String> {
    let mut session = Session::open(store)?;
    let details = CheckoutDetails::from(args);

    let confirmation = checkout(&mut session.cart, &details, &session.config.pricing)
        .map_err(|error| format!("checkout failed: {error}"))?;

    write_confirmation(stdout(), &confirmation)
        .map_err(|error| format!("failed to write confirmation: {error}"))
}
