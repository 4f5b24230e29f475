//! Selection validation and the customization selection builder

use super::money::validate_price;
use super::PricingError;
use shared::{Customization, Product};
use std::collections::{HashMap, HashSet};

/// Resolve and validate selected customization ids for a product
///
/// Returns the normalized multiset in selection order: boolean ids selected
/// more than once collapse to a single entry, quantity ids keep every
/// occurrence. Rejects inactive products, unknown ids and two booleans from
/// the same exclusive group.
pub fn validate_selections<S: AsRef<str>>(
    product: &Product,
    selected: &[S],
) -> Result<Vec<Customization>, PricingError> {
    if !product.is_active {
        return Err(PricingError::ProductInactive(product.id.clone()));
    }
    validate_price(product.base_price, "base_price")?;

    let mut resolved = Vec::with_capacity(selected.len());
    let mut seen_booleans: HashSet<&str> = HashSet::new();
    let mut group_owner: HashMap<&str, &str> = HashMap::new();

    for id in selected {
        let id = id.as_ref();
        let customization =
            product
                .customization(id)
                .ok_or_else(|| PricingError::UnknownCustomization {
                    product_id: product.id.clone(),
                    customization_id: id.to_string(),
                })?;
        validate_price(customization.unit_price, "customization unit_price")?;

        if customization.is_boolean() {
            if !seen_booleans.insert(customization.id.as_str()) {
                continue;
            }
            if let Some(group) = customization.exclusive_group() {
                if let Some(owner) = group_owner.get(group) {
                    return Err(PricingError::GroupConflict {
                        group: group.to_string(),
                        first: (*owner).to_string(),
                        second: customization.id.clone(),
                    });
                }
                group_owner.insert(group, customization.id.as_str());
            }
        }
        resolved.push(customization.clone());
    }

    Ok(resolved)
}

/// The user's customization choices for one product, before pricing
///
/// Keeps a count per customization id in first-selection order. Boolean
/// customizations are 0 or 1; picking a grouped boolean deselects the rest
/// of its group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    counts: Vec<(String, u32)>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    fn definition<'a>(product: &'a Product, id: &str) -> Result<&'a Customization, PricingError> {
        product
            .customization(id)
            .ok_or_else(|| PricingError::UnknownCustomization {
                product_id: product.id.clone(),
                customization_id: id.to_string(),
            })
    }

    fn set(&mut self, id: &str, count: u32) {
        match self.counts.iter().position(|(c, _)| c == id) {
            Some(idx) if count == 0 => {
                self.counts.remove(idx);
            }
            Some(idx) => self.counts[idx].1 = count,
            None if count > 0 => self.counts.push((id.to_string(), count)),
            None => {}
        }
    }

    fn select_boolean(&mut self, product: &Product, customization: &Customization) {
        if let Some(group) = customization.exclusive_group() {
            let siblings: Vec<String> = product
                .group_members(group)
                .filter(|c| c.id != customization.id)
                .map(|c| c.id.clone())
                .collect();
            self.counts.retain(|(id, _)| !siblings.contains(id));
        }
        self.set(&customization.id, 1);
    }

    /// Flip a customization on or off; returns whether it is now selected
    pub fn toggle(&mut self, product: &Product, id: &str) -> Result<bool, PricingError> {
        let customization = Self::definition(product, id)?;
        if self.is_selected(id) {
            self.set(id, 0);
            return Ok(false);
        }
        if customization.is_boolean() {
            self.select_boolean(product, customization);
        } else {
            self.set(id, 1);
        }
        Ok(true)
    }

    /// Add one unit of a customization; returns the new count
    ///
    /// For a boolean this is the same as selecting it.
    pub fn increment(&mut self, product: &Product, id: &str) -> Result<u32, PricingError> {
        let customization = Self::definition(product, id)?;
        if customization.is_boolean() {
            self.select_boolean(product, customization);
            return Ok(1);
        }
        let count = self.count(id) + 1;
        self.set(id, count);
        Ok(count)
    }

    /// Remove one unit of a customization (never below zero); returns the new count
    pub fn decrement(&mut self, id: &str) -> u32 {
        let count = self.count(id).saturating_sub(1);
        self.set(id, count);
        count
    }

    pub fn count(&self, id: &str) -> u32 {
        self.counts
            .iter()
            .find(|(c, _)| c == id)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn clear(&mut self) {
        self.counts.clear();
    }

    /// Selected ids as a multiset (an id selected N times appears N times)
    pub fn ids(&self) -> Vec<&str> {
        self.counts
            .iter()
            .flat_map(|(id, n)| std::iter::repeat_n(id.as_str(), *n as usize))
            .collect()
    }

    /// Validate against the product and return the customization multiset
    pub fn resolve(&self, product: &Product) -> Result<Vec<Customization>, PricingError> {
        validate_selections(product, &self.ids())
    }
}
