//! Receipt
//!
//! Text rendering of a cart and its order summary.

use std::io;

use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartState,
    checkout::OrderConfirmation,
    items::LineItem,
    pricing::{OrderSummary, PricingError},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error writing to the output.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),

    /// A line total could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Write the cart lines followed by the order summary.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if writing to `out` fails or a line total overflows.
pub fn write_cart(
    mut out: impl io::Write,
    cart: &CartState,
    summary: &OrderSummary,
) -> Result<(), ReceiptError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty.")?;
        return Ok(());
    }

    write_lines_table(&mut out, cart.items())?;
    write_summary(&mut out, summary)?;

    Ok(())
}

/// Write an order confirmation: order number, the lines ordered and the amounts charged.
///
/// # Errors
///
/// Returns a [`ReceiptError`] if writing to `out` fails or a line total overflows.
pub fn write_confirmation(
    mut out: impl io::Write,
    confirmation: &OrderConfirmation,
) -> Result<(), ReceiptError> {
    writeln!(
        out,
        "Thank you for your purchase. Your order #{} has been confirmed.",
        confirmation.order_id
    )?;
    writeln!(
        out,
        "A confirmation email has been sent to {}.",
        confirmation.email
    )?;

    write_lines_table(&mut out, &confirmation.items)?;
    write_summary(&mut out, &confirmation.summary)?;

    Ok(())
}

/// Describes the variant and metal selections of a line, e.g. `Size 7, Yellow Gold`.
pub fn selection_label(item: &LineItem) -> String {
    match (item.variant(), item.metal_option()) {
        (Some(variant), Some(metal)) => format!("Size {variant}, {metal}"),
        (Some(variant), None) => format!("Size {variant}"),
        (None, Some(metal)) => metal.to_string(),
        (None, None) => String::new(),
    }
}

fn write_lines_table(out: &mut impl io::Write, items: &[LineItem]) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["", "Item", "Selection", "Price", "Qty", "Total"]);

    for (idx, item) in items.iter().enumerate() {
        builder.push_record([
            format!("#{}", idx + 1),
            item.name().to_string(),
            selection_label(item),
            item.unit_price().to_string(),
            item.quantity().to_string(),
            item.line_total()?.to_string(),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

fn write_summary(out: &mut impl io::Write, summary: &OrderSummary) -> Result<(), ReceiptError> {
    let shipping = if summary.ships_free() {
        "Free".to_string()
    } else {
        summary.shipping.to_string()
    };

    let rows = [
        (" Subtotal:", format!("{}  ", summary.subtotal)),
        (" Shipping:", format!("{shipping}  ")),
        (" Tax:", format!("{}  ", summary.tax)),
        (" Total:", format!("{}  ", summary.total)),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, "{label:<label_width$}{value:>value_width$}")?;
    }

    writeln!(out)?;

    Ok(())
}
