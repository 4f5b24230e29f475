//! Cart line merge identity

use sha2::{Digest, Sha256};
use shared::Customization;
use std::collections::BTreeMap;

/// Content hash over product id + customization multiset
///
/// The multiset is sorted before hashing, so two selections that differ only
/// in order share a key. Boolean customizations count once.
pub fn line_key(product_id: &str, customizations: &[Customization]) -> String {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for c in customizations {
        let count = counts.entry(c.id.as_str()).or_insert(0);
        if !c.is_boolean() || *count == 0 {
            *count += 1;
        }
    }

    let mut hasher = Sha256::new();
    hasher.update((product_id.len() as u64).to_le_bytes());
    hasher.update(product_id.as_bytes());
    for (id, count) in counts {
        hasher.update((id.len() as u64).to_le_bytes());
        hasher.update(id.as_bytes());
        hasher.update(count.to_le_bytes());
    }

    let result = hasher.finalize();
    hex::encode(&result[..16])
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CustomizationCategory;
    use shared::SelectionKind;

    fn c(id: &str, kind: SelectionKind) -> Customization {
        Customization {
            id: id.to_string(),
            name: id.to_string(),
            category: CustomizationCategory::Sauce,
            unit_price: 0.0,
            selection_kind: kind,
            group: None,
        }
    }

    #[test]
    fn test_key_ignores_order() {
        let a = c("shoyu", SelectionKind::Boolean);
        let b = c("gergelim", SelectionKind::Quantity);
        assert_eq!(
            line_key("p1", &[a.clone(), b.clone(), b.clone()]),
            line_key("p1", &[b.clone(), a, b])
        );
    }

    #[test]
    fn test_key_distinguishes_counts_and_products() {
        let b = c("gergelim", SelectionKind::Quantity);
        let one = line_key("p1", std::slice::from_ref(&b));
        let two = line_key("p1", &[b.clone(), b.clone()]);
        assert_ne!(one, two);
        assert_ne!(one, line_key("p2", &[b]));
        assert_eq!(one.len(), 32);
    }

    #[test]
    fn test_duplicate_boolean_is_same_key() {
        let a = c("shoyu", SelectionKind::Boolean);
        assert_eq!(
            line_key("p1", &[a.clone(), a.clone()]),
            line_key("p1", &[a])
        );
    }
}
