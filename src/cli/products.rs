use std::io::Write;

use aura::{
    catalog::{PriceRange, ProductFilter, SortOrder, placeholder_image},
    config::StoreConfig,
    pricing::minor_units_from_decimal,
    products::Product,
};
use clap::Args;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use super::{Session, load_catalog, stdout, write_err};

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    /// Only products in this category
    #[arg(long)]
    category: Option<String>,

    /// Products made of this material; repeat to match any of several
    #[arg(long = "material")]
    materials: Vec<String>,

    /// Products set with this gemstone; repeat to match any of several
    #[arg(long = "gemstone")]
    gemstones: Vec<String>,

    /// Price bracket offered by the catalog, e.g. `under-250`; see `aura filters`
    #[arg(long, conflicts_with_all = ["min_price", "max_price"])]
    price_range: Option<String>,

    /// Lowest price, in major units
    #[arg(long)]
    min_price: Option<Decimal>,

    /// Highest price, in major units
    #[arg(long)]
    max_price: Option<Decimal>,

    /// Listing order
    #[arg(long, value_enum, default_value_t = SortOrder::Featured)]
    sort: SortOrder,

    /// Only featured products
    #[arg(long)]
    featured: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ShowProductArgs {
    /// Product id
    id: String,

    /// Number of related products to list
    #[arg(long, default_value_t = 3)]
    related: usize,
}

pub(crate) fn list(store: &StoreConfig, args: &ListProductsArgs) -> Result<(), String> {
    let config = store.cart_config();
    let catalog = load_catalog(store, &config)?;

    let mut filter = ProductFilter::new().sort(args.sort);

    if let Some(category) = &args.category {
        filter = filter.category(category.as_str());
    }

    for material in &args.materials {
        filter = filter.toggle_material(material);
    }

    for gemstone in &args.gemstones {
        filter = filter.toggle_gemstone(gemstone);
    }

    if let Some(id) = &args.price_range {
        let bracket = catalog
            .filters()
            .price_range(id)
            .ok_or_else(|| format!("unknown price range: {id}"))?;

        filter = filter.price_range(bracket.range);
    } else if let Some(range) = price_range(args, config.currency)? {
        filter = filter.price_range(range);
    }

    let products: Vec<&Product> = catalog
        .filter(&filter)
        .into_iter()
        .filter(|product| !args.featured || product.featured)
        .collect();

    let mut out = stdout();

    if products.is_empty() {
        writeln!(out, "No products match these filters.").map_err(write_err)?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Id", "Name", "Category", "Price", ""]);

    for product in &products {
        builder.push_record([
            product.id.to_string(),
            product.name.clone(),
            product.category.clone(),
            product.price.to_string(),
            badges(product),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}").map_err(write_err)?;
    writeln!(out, "{} products", products.len()).map_err(write_err)
}

pub(crate) fn filters(store: &StoreConfig) -> Result<(), String> {
    let config = store.cart_config();
    let catalog = load_catalog(store, &config)?;
    let filters = catalog.filters();
    let mut out = stdout();

    if filters.is_empty() {
        writeln!(out, "The catalog offers no filters.").map_err(write_err)?;
        return Ok(());
    }

    if !filters.materials.is_empty() {
        writeln!(out, "Materials: {}", filters.materials.join(", ")).map_err(write_err)?;
    }

    if !filters.gemstones.is_empty() {
        writeln!(out, "Gemstones: {}", filters.gemstones.join(", ")).map_err(write_err)?;
    }

    if !filters.price_ranges.is_empty() {
        writeln!(out, "Price ranges:").map_err(write_err)?;

        for bracket in &filters.price_ranges {
            writeln!(out, "  {:<12} {}", bracket.id, bracket.name).map_err(write_err)?;
        }
    }

    Ok(())
}

pub(crate) fn show(store: &StoreConfig, args: &ShowProductArgs) -> Result<(), String> {
    let session = Session::open(store)?;
    let product = session.product(&args.id)?;
    let mut out = stdout();

    writeln!(out, "{} ({})", product.name, product.id).map_err(write_err)?;
    writeln!(out, "{}", product.price).map_err(write_err)?;

    if let Some(description) = &product.description {
        writeln!(out, "\n{description}").map_err(write_err)?;
    }

    writeln!(out).map_err(write_err)?;
    writeln!(out, "Category:  {}", product.category).map_err(write_err)?;

    if !product.materials.is_empty() {
        writeln!(out, "Materials: {}", product.materials.join(", ")).map_err(write_err)?;
    }

    if product.has_variants() {
        let variants: Vec<String> = product
            .variants
            .iter()
            .filter_map(|variant| {
                variant.label().map(|label| {
                    if variant.available {
                        label.to_string()
                    } else {
                        format!("{label} (sold out)")
                    }
                })
            })
            .collect();

        writeln!(out, "Sizes:     {}", variants.join(", ")).map_err(write_err)?;
    }

    if !product.metal_options.is_empty() {
        writeln!(out, "Metals:    {}", product.metal_options.join(", ")).map_err(write_err)?;
    }

    let image = product
        .primary_image()
        .unwrap_or_else(|| placeholder_image(&product.category, 0));

    writeln!(out, "Image:     {image}").map_err(write_err)?;

    let related = session.catalog.related(&product.id, args.related);

    if !related.is_empty() {
        writeln!(out, "\nYou may also like:").map_err(write_err)?;

        for other in related {
            writeln!(out, "  {:<8} {:<32} {}", other.id.as_str(), other.name, other.price)
                .map_err(write_err)?;
        }
    }

    Ok(())
}

fn price_range(
    args: &ListProductsArgs,
    currency: &'static Currency,
) -> Result<Option<PriceRange>, String> {
    if args.min_price.is_none() && args.max_price.is_none() {
        return Ok(None);
    }

    let min = args.min_price.unwrap_or(Decimal::ZERO);
    let min = minor_units_from_decimal(min, currency)
        .ok_or_else(|| format!("invalid minimum price: {min}"))?;

    let max = match args.max_price {
        Some(max) => minor_units_from_decimal(max, currency)
            .ok_or_else(|| format!("invalid maximum price: {max}"))?,
        None => i64::MAX,
    };

    if min > max {
        return Err("minimum price is above maximum price".to_string());
    }

    Ok(Some(PriceRange::new(
        Money::from_minor(min, currency),
        Money::from_minor(max, currency),
    )))
}

fn badges(product: &Product) -> String {
    match (product.featured, product.new) {
        (true, true) => "featured, new".to_string(),
        (true, false) => "featured".to_string(),
        (false, true) => "new".to_string(),
        (false, false) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Show {
        #[command(flatten)]
        args: ShowProductArgs,
    }

    #[derive(Debug, Parser)]
    struct List {
        #[command(flatten)]
        args: ListProductsArgs,
    }

    #[test]
    fn related_defaults_to_three() -> TestResult {
        let parsed = Show::try_parse_from(["product", "ring-001"])?;

        assert_eq!(parsed.args.related, 3);

        Ok(())
    }

    #[test]
    fn named_price_range_excludes_explicit_bounds() -> TestResult {
        let parsed = List::try_parse_from(["products", "--price-range", "under-250"])?;

        assert_eq!(parsed.args.price_range.as_deref(), Some("under-250"));
        assert!(
            List::try_parse_from(["products", "--price-range", "under-250", "--min-price", "10"])
                .is_err()
        );

        Ok(())
    }
}
