//! Cart commands.
//!
//! Failures have already been shown to the user by the cart's notifier by
//! the time these return an error; the error only decides the exit code.

use rocketshoes_cart::{CartError, CartSummary, UpdateProductAmount};
use rocketshoes_core::{LineItem, ProductId};
use tracing::info;

use super::Cart;

/// Print every line item and the totals.
#[allow(clippy::print_stdout)]
pub fn show(cart: &Cart) {
    print!("{}", render(cart.cart(), &cart.summary()));
}

/// Add one unit of `product_id`.
///
/// # Errors
///
/// Returns the cart error if the add was rejected or failed.
pub async fn add(cart: &mut Cart, product_id: ProductId) -> Result<(), CartError> {
    cart.add_product(product_id).await?;
    let amount = cart.get(product_id).map_or(0, |item| item.amount);
    info!(%product_id, amount, "Product added");
    print_summary(&cart.summary());
    Ok(())
}

/// Remove `product_id` from the cart.
///
/// # Errors
///
/// Returns the cart error if the product is not in the cart or the write failed.
pub fn remove(cart: &mut Cart, product_id: ProductId) -> Result<(), CartError> {
    cart.remove_product(product_id)?;
    info!(%product_id, "Product removed");
    print_summary(&cart.summary());
    Ok(())
}

/// Set the quantity of `product_id`.
///
/// # Errors
///
/// Returns the cart error if the update was rejected or failed.
pub async fn update(cart: &mut Cart, product_id: ProductId, amount: i64) -> Result<(), CartError> {
    if amount <= 0 {
        info!(%product_id, amount, "Ignoring non-positive quantity");
    }
    cart.update_product_amount(UpdateProductAmount { product_id, amount })
        .await?;
    print_summary(&cart.summary());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_summary(summary: &CartSummary) {
    println!("{}", summary_line(summary));
}

fn summary_line(summary: &CartSummary) -> String {
    format!(
        "{} item(s), {} product(s), subtotal {}",
        summary.item_count,
        summary.distinct_items,
        summary.formatted_subtotal()
    )
}

/// Render the cart as a plain-text table.
fn render(items: &[LineItem], summary: &CartSummary) -> String {
    if items.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut lines: Vec<String> = items.iter().map(render_line).collect();
    lines.push(summary_line(summary));
    lines.push(String::new());
    lines.join("\n")
}

fn render_line(item: &LineItem) -> String {
    format!(
        "{:>5}  {:<40}  {:>3} x {:>9} = {:>10}",
        item.id().as_i32(),
        item.product.title.as_deref().unwrap_or("(untitled)"),
        item.amount,
        item.product.unit_price().display(),
        item.subtotal().display()
    )
}
