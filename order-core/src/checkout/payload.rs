//! Order creation payload assembly

use crate::pricing::money::{to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::DeliveryAddress;
use shared::order::{
    CartLine, CreateOrderItem, CreateOrderRequest, CustomizationRef, FulfillmentMethod,
    OrderItem, OrderItemCustomization, PaymentMethod,
};

/// Per-unit price of a line as sent to the backend (`total / quantity`)
fn unit_price(line: &CartLine) -> f64 {
    if line.quantity <= 0 {
        return 0.0;
    }
    to_f64(to_decimal(line.total_price) / Decimal::from(line.quantity))
}

/// `"true"` for a boolean selection, the selected count otherwise
fn customization_refs(line: &CartLine) -> Vec<CustomizationRef> {
    line.customization_counts()
        .into_iter()
        .map(|(c, count)| CustomizationRef {
            customization_id: c.id.clone(),
            value: if c.is_boolean() {
                "true".to_string()
            } else {
                count.to_string()
            },
        })
        .collect()
}

pub fn order_item(line: &CartLine) -> CreateOrderItem {
    CreateOrderItem {
        product_id: line.product_id.clone(),
        quantity: line.quantity,
        unit_price: unit_price(line),
        observations: line.note.clone(),
        customizations: customization_refs(line),
    }
}

/// Build the create-order request
///
/// The address is attached only for delivery.
pub fn build_order_request(
    store_id: &str,
    lines: &[CartLine],
    payment: PaymentMethod,
    fulfillment: FulfillmentMethod,
    address: DeliveryAddress,
    observations: Option<String>,
) -> CreateOrderRequest {
    CreateOrderRequest {
        store_id: store_id.to_string(),
        items: lines.iter().map(order_item).collect(),
        payment_method: payment,
        fulfillment_method: fulfillment,
        delivery_address: fulfillment.requires_address().then_some(address),
        observations,
    }
}

/// Order item view of a cart line (optimistic order shown after submit)
pub fn optimistic_item(line: &CartLine) -> OrderItem {
    OrderItem {
        product_id: line.product_id.clone(),
        product_name: line.product_name.clone(),
        quantity: line.quantity,
        unit_price: unit_price(line),
        total_price: line.total_price,
        observations: line.note.clone(),
        customizations: line
            .customization_counts()
            .into_iter()
            .map(|(c, count)| OrderItemCustomization {
                customization_id: c.id.clone(),
                name: c.name.clone(),
                value: if c.is_boolean() {
                    "true".to_string()
                } else {
                    count.to_string()
                },
                unit_price: c.unit_price,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CustomizationCategory;
    use shared::{Customization, SelectionKind};

    fn c(id: &str, price: f64, kind: SelectionKind) -> Customization {
        Customization {
            id: id.to_string(),
            name: id.to_string(),
            category: CustomizationCategory::Topping,
            unit_price: price,
            selection_kind: kind,
            group: None,
        }
    }

    fn line() -> CartLine {
        let granola = c("granola", 3.0, SelectionKind::Quantity);
        CartLine {
            line_key: "k".to_string(),
            product_id: "acai-500".to_string(),
            product_name: "Açaí 500ml".to_string(),
            base_price: 18.9,
            quantity: 2,
            customizations: vec![
                c("leite-po", 0.0, SelectionKind::Boolean),
                granola.clone(),
                granola,
            ],
            total_price: 49.8,
            note: Some("sem açúcar".to_string()),
        }
    }

    #[test]
    fn test_item_refs_and_unit_price() {
        let item = order_item(&line());
        assert_eq!(item.unit_price, 24.9);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.observations.as_deref(), Some("sem açúcar"));
        let refs: Vec<_> = item
            .customizations
            .iter()
            .map(|r| (r.customization_id.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(refs, vec![("leite-po", "true"), ("granola", "2")]);
    }

    #[test]
    fn test_address_only_for_delivery() {
        let address = DeliveryAddress {
            street: "Rua A".to_string(),
            ..Default::default()
        };
        let pickup = build_order_request(
            "s1",
            &[line()],
            PaymentMethod::Pix,
            FulfillmentMethod::Pickup,
            address.clone(),
            None,
        );
        assert!(pickup.delivery_address.is_none());
        let json = serde_json::to_value(&pickup).unwrap();
        assert!(json.get("deliveryAddress").is_none());

        let delivery = build_order_request(
            "s1",
            &[line()],
            PaymentMethod::Cash,
            FulfillmentMethod::Delivery,
            address,
            Some("troco para 100".to_string()),
        );
        assert_eq!(delivery.delivery_address.unwrap().street, "Rua A");
        assert_eq!(delivery.observations.as_deref(), Some("troco para 100"));
    }

    #[test]
    fn test_optimistic_item() {
        let item = optimistic_item(&line());
        assert_eq!(item.total_price, 49.8);
        assert_eq!(item.customizations[1].value, "2");
        assert_eq!(item.customizations[1].unit_price, 3.0);
    }
}
