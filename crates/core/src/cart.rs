//! Session cart: a mapping from package to quantity.
//!
//! The cart itself never stores prices. Totals and line items are derived by
//! joining the mapping against the current catalog with [`Cart::price`],
//! which also prunes entries whose package no longer exists.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::{Package, PackageId, PriceRange};

/// Package id → quantity, scoped to one visitor session.
///
/// Serializes as a JSON object (`{"7": 2, "9": 1}`) so it can live in a
/// session store as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: BTreeMap<PackageId, u32>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `package`.
    ///
    /// Returns `false` and leaves the cart untouched when the package is
    /// inactive or its button behavior is not add-to-cart.
    pub fn add(&mut self, package: &Package) -> bool {
        if !package.can_add_to_cart() {
            return false;
        }
        let quantity = self.items.entry(package.id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        true
    }

    /// Remove the whole entry for `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: PackageId) -> bool {
        self.items.remove(&id).is_some()
    }

    /// Quantity of `id` in the cart (0 if absent).
    #[must_use]
    pub fn quantity(&self, id: PackageId) -> u32 {
        self.items.get(&id).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Package ids in ascending order.
    #[must_use]
    pub fn package_ids(&self) -> Vec<PackageId> {
        self.items.keys().copied().collect()
    }

    /// Price the cart against `packages`.
    ///
    /// Entries whose id is missing from `packages` are removed from the cart
    /// as a side effect and reported in [`PricedCart::pruned`]. Every
    /// surviving entry contributes `quantity × price` to the totals, whether
    /// or not the package is still active.
    pub fn price(&mut self, packages: &HashMap<PackageId, Package>) -> PricedCart {
        let pruned: Vec<PackageId> = self
            .items
            .keys()
            .filter(|id| !packages.contains_key(id))
            .copied()
            .collect();
        for id in &pruned {
            self.items.remove(id);
        }

        let lines: Vec<LineItem> = self
            .items
            .iter()
            .filter_map(|(id, quantity)| {
                packages.get(id).map(|package| LineItem {
                    line_total: package.price.times(*quantity),
                    package: package.clone(),
                    quantity: *quantity,
                })
            })
            .collect();

        let totals = lines.iter().map(|line| line.line_total).sum();

        PricedCart {
            lines,
            totals,
            pruned,
        }
    }
}

/// One cart entry joined with its package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub package: Package,
    pub quantity: u32,
    /// `quantity × package.price`.
    pub line_total: PriceRange,
}

/// Result of [`Cart::price`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PricedCart {
    /// Surviving entries in ascending package id order.
    pub lines: Vec<LineItem>,
    /// Sum of all line totals.
    pub totals: PriceRange,
    /// Ids that were dropped because their package no longer exists.
    pub pruned: Vec<PackageId>,
}

impl PricedCart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across the surviving lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Amount charged at checkout: the upper bound of the total.
    #[must_use]
    pub const fn charge_amount(&self) -> rust_decimal::Decimal {
        self.totals.max
    }
}
