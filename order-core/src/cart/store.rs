//! Cart store
//!
//! Single-writer collection of priced cart lines. Every mutation persists the
//! full snapshot; persistence failures are logged and never fail the
//! mutation. Lines merge structurally: two additions with the same product
//! and customization multiset become one line.

use super::error::CartError;
use super::identity::line_key;
use super::storage::CartStorage;
use crate::pricing::money::{MAX_QUANTITY, to_decimal, to_f64, validate_quantity};
use crate::pricing::{self, Selections};
use crate::utils::validation::{MAX_NOTE_LEN, normalize_optional_text};
use parking_lot::Mutex;
use shared::{CartLine, Product};
use std::sync::Arc;

/// Cart shared between the storefront screens and the checkout session
pub type SharedCart = Arc<Mutex<CartStore>>;

pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn CartStorage>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.lines)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart, hydrating from the saved snapshot when one is readable
    pub fn open(storage: Arc<dyn CartStorage>) -> Self {
        let lines = match storage.load() {
            Ok(Some(lines)) => {
                tracing::debug!(lines = lines.len(), "Cart hydrated from snapshot");
                lines
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable cart snapshot");
                Vec::new()
            }
        };
        Self { lines, storage }
    }

    /// Wrap the store for sharing with a checkout session
    pub fn into_shared(self) -> SharedCart {
        Arc::new(Mutex::new(self))
    }

    /// Merge a priced line into the cart
    ///
    /// A line with the same product and customization multiset as an
    /// existing one adds its quantity and total to that line; otherwise it
    /// is appended. Every call counts, retries included. A line whose
    /// resulting quantity would leave `1..=MAX_QUANTITY` is ignored.
    pub fn add(&mut self, mut line: CartLine) {
        if line.quantity <= 0 {
            tracing::warn!(
                product_id = %line.product_id,
                quantity = line.quantity,
                "Ignoring cart line with non-positive quantity"
            );
            return;
        }
        line.line_key = line_key(&line.product_id, &line.customizations);

        let Some(merged) = self.merged_quantity(&line.line_key, line.quantity) else {
            tracing::warn!(
                product_id = %line.product_id,
                quantity = line.quantity,
                max = MAX_QUANTITY,
                "Ignoring cart line above the quantity limit"
            );
            return;
        };

        match self.lines.iter_mut().find(|l| l.line_key == line.line_key) {
            Some(existing) => {
                existing.quantity = merged;
                existing.total_price =
                    to_f64(to_decimal(existing.total_price) + to_decimal(line.total_price));
                if existing.note.is_none() {
                    existing.note = line.note;
                }
                tracing::debug!(
                    product_id = %existing.product_id,
                    quantity = existing.quantity,
                    "Merged cart line"
                );
            }
            None => {
                tracing::debug!(product_id = %line.product_id, quantity = line.quantity, "Added cart line");
                self.lines.push(line);
            }
        }
        self.persist();
    }

    /// Validate the selections, price the line and add it
    pub fn add_product(
        &mut self,
        product: &Product,
        selections: &Selections,
        quantity: i32,
        note: Option<String>,
    ) -> Result<(), CartError> {
        validate_quantity(quantity)?;
        let note = normalize_optional_text(note);
        if let Some(n) = &note {
            let len = n.chars().count();
            if len > MAX_NOTE_LEN {
                return Err(CartError::NoteTooLong {
                    len,
                    max: MAX_NOTE_LEN,
                });
            }
        }

        let customizations = selections.resolve(product)?;
        let key = line_key(&product.id, &customizations);
        if self.merged_quantity(&key, quantity).is_none() {
            return Err(CartError::QuantityLimit {
                current: self.quantity_of(&key),
                added: quantity,
                max: MAX_QUANTITY,
            });
        }
        let total_price = pricing::price_line(product, quantity, &customizations);

        self.add(CartLine {
            line_key: key,
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            base_price: product.base_price,
            quantity,
            customizations,
            total_price,
            note,
        });
        Ok(())
    }

    /// Remove every line of a product, whatever its customizations
    ///
    /// Returns the number of lines removed.
    pub fn remove(&mut self, product_id: &str) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        let removed = before - self.lines.len();
        if removed > 0 {
            tracing::debug!(product_id = %product_id, removed, "Removed cart lines");
            self.persist();
        }
        removed
    }

    /// Set the quantity of every line of a product (≤ 0 removes them)
    ///
    /// Totals are recomputed from each line's base price and customizations.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        validate_quantity(quantity)?;

        let mut changed = false;
        for line in self.lines.iter_mut().filter(|l| l.product_id == product_id) {
            line.quantity = quantity;
            line.total_price = pricing::line_total(line);
            changed = true;
        }
        if changed {
            tracing::debug!(product_id = %product_id, quantity, "Cart quantity updated");
            self.persist();
        }
        Ok(())
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line quantities
    pub fn total_items(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Sum of line totals
    pub fn total_amount(&self) -> f64 {
        pricing::price_cart(&self.lines)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Owned copy of the current lines
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    fn quantity_of(&self, key: &str) -> i32 {
        self.lines
            .iter()
            .find(|l| l.line_key == key)
            .map_or(0, |l| l.quantity)
    }

    /// Quantity the line keyed `key` would hold after adding `quantity`,
    /// or `None` past `MAX_QUANTITY`
    fn merged_quantity(&self, key: &str, quantity: i32) -> Option<i32> {
        self.quantity_of(key)
            .checked_add(quantity)
            .filter(|merged| *merged <= MAX_QUANTITY)
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.lines) {
            tracing::warn!(error = %e, lines = self.lines.len(), "Failed to persist cart snapshot");
        }
    }
}
