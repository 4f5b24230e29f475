//! Line and cart pricing
//!
//! Pure functions: no I/O, no clock, no randomness.
//!
//! ```text
//! contribution(boolean)  = unit_price                 (present or absent)
//! contribution(quantity) = unit_price × selectedCount
//! line total             = (base_price + Σ contributions) × quantity
//! cart total             = Σ line totals
//! ```

use super::money::{round_money, to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::{CartLine, Customization, Product};
use std::collections::HashSet;

/// Per-unit price: base price plus the selected customizations
///
/// A boolean customization contributes its unit price once no matter how
/// many times it appears in `selections`.
pub fn unit_price(base_price: f64, selections: &[Customization]) -> Decimal {
    let mut seen_booleans: HashSet<&str> = HashSet::new();
    let contributions: Decimal = selections
        .iter()
        .filter(|c| !c.is_boolean() || seen_booleans.insert(c.id.as_str()))
        .map(|c| to_decimal(c.unit_price))
        .sum();

    round_money(to_decimal(base_price) + contributions)
}

/// Price a line: `(base + Σ contributions) × quantity`
pub fn price_line(product: &Product, quantity: i32, selections: &[Customization]) -> f64 {
    to_f64(line_amount(product.base_price, quantity, selections))
}

fn line_amount(base_price: f64, quantity: i32, selections: &[Customization]) -> Decimal {
    unit_price(base_price, selections) * Decimal::from(quantity.max(0))
}

/// Recompute a cart line's total from its own snapshot fields
pub fn line_total(line: &CartLine) -> f64 {
    to_f64(line_amount(line.base_price, line.quantity, &line.customizations))
}

/// Per-unit price of a cart line
pub fn line_unit_price(line: &CartLine) -> f64 {
    to_f64(unit_price(line.base_price, &line.customizations))
}

/// Cart total: Σ line totals
pub fn price_cart(lines: &[CartLine]) -> f64 {
    to_f64(lines.iter().map(|l| to_decimal(l.total_price)).sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CustomizationCategory;
    use shared::SelectionKind;

    fn customization(id: &str, price: f64, kind: SelectionKind) -> Customization {
        Customization {
            id: id.to_string(),
            name: id.to_string(),
            category: CustomizationCategory::Topping,
            unit_price: price,
            selection_kind: kind,
            group: None,
        }
    }

    fn product(base_price: f64, customizations: Vec<Customization>) -> Product {
        Product {
            id: "acai-500".to_string(),
            name: "Açaí 500ml".to_string(),
            base_price,
            customizations,
            is_active: true,
        }
    }

    #[test]
    fn test_boolean_selection_never_multiplies() {
        let banana = customization("banana", 2.5, SelectionKind::Boolean);
        let mel = customization("mel", 1.0, SelectionKind::Boolean);
        let p = product(10.0, vec![banana.clone(), mel.clone()]);

        let once = price_line(&p, 1, &[banana.clone(), mel.clone()]);
        let repeated = price_line(&p, 1, &[banana.clone(), banana.clone(), mel.clone(), banana]);
        assert_eq!(once, 13.5);
        assert_eq!(repeated, once);
        assert_eq!(price_line(&p, 3, &[mel]), 33.0);
    }

    #[test]
    fn test_quantity_selection_scales_linearly() {
        let granola = customization("granola", 3.0, SelectionKind::Quantity);
        let p = product(18.9, vec![granola.clone()]);

        let none = price_line(&p, 1, &[]);
        let two = price_line(&p, 1, &[granola.clone(), granola.clone()]);
        let four = price_line(&p, 1, &vec![granola; 4]);
        assert_eq!(none, 18.9);
        assert_eq!(two, 24.9);
        assert_eq!(four, 30.9);
        // Doubling the selected count doubles only that term
        assert!(((four - none) - 2.0 * (two - none)).abs() < 1e-9);
    }

    #[test]
    fn test_reference_line() {
        // 18.90 + free boolean + 2 × 3.00 quantity = 24.90
        let leite = customization("leite-po", 0.0, SelectionKind::Boolean);
        let granola = customization("granola", 3.0, SelectionKind::Quantity);
        let p = product(18.9, vec![leite.clone(), granola.clone()]);

        assert_eq!(price_line(&p, 1, &[leite, granola.clone(), granola]), 24.9);
    }

    #[test]
    fn test_price_cart_sums_line_totals() {
        let line = |total: f64| CartLine {
            line_key: format!("k{total}"),
            product_id: "p".to_string(),
            product_name: "p".to_string(),
            base_price: total,
            quantity: 1,
            customizations: vec![],
            total_price: total,
            note: None,
        };
        assert_eq!(price_cart(&[line(0.1), line(0.2)]), 0.3);
        assert_eq!(price_cart(&[]), 0.0);
    }

    #[test]
    fn test_line_total_and_unit_price() {
        let granola = customization("granola", 3.0, SelectionKind::Quantity);
        let line = CartLine {
            line_key: "k".to_string(),
            product_id: "acai-500".to_string(),
            product_name: "Açaí 500ml".to_string(),
            base_price: 18.9,
            quantity: 3,
            customizations: vec![granola.clone(), granola],
            total_price: 0.0,
            note: None,
        };
        assert_eq!(line_unit_price(&line), 24.9);
        assert_eq!(line_total(&line), 74.7);
    }
}
