//! Cart totals for display.

use rocketshoes_core::{LineItem, Price};

/// Aggregate view of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Total units across all lines.
    pub item_count: u64,
    /// Number of distinct products.
    pub distinct_items: usize,
    /// Sum of price times amount over all lines.
    pub subtotal: Price,
}

impl CartSummary {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            item_count: 0,
            distinct_items: 0,
            subtotal: Price::ZERO,
        }
    }

    /// Summarize a sequence of line items.
    #[must_use]
    pub fn from_items(items: &[LineItem]) -> Self {
        Self {
            item_count: items.iter().map(|item| u64::from(item.amount)).sum(),
            distinct_items: items.len(),
            subtotal: items.iter().map(LineItem::subtotal).sum(),
        }
    }

    /// Subtotal formatted for display (e.g., "$359.80").
    #[must_use]
    pub fn formatted_subtotal(&self) -> String {
        self.subtotal.display()
    }
}

impl From<&[LineItem]> for CartSummary {
    fn from(items: &[LineItem]) -> Self {
        Self::from_items(items)
    }
}
