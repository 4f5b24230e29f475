//! Delivery address validation and the checkout address form

use crate::utils::validation::MAX_ADDRESS_FIELD_LEN;
use serde::Serialize;
use shared::DeliveryAddress;
use shared::models::SavedAddress;
use std::collections::BTreeMap;
use std::fmt;

/// Required address field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressField {
    Street,
    Number,
    Neighborhood,
    City,
    State,
    Zip,
}

impl AddressField {
    pub const ALL: [AddressField; 6] = [
        Self::Street,
        Self::Number,
        Self::Neighborhood,
        Self::City,
        Self::State,
        Self::Zip,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Street => "street",
            Self::Number => "number",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::State => "state",
            Self::Zip => "zip",
        }
    }

    fn value<'a>(&self, address: &'a DeliveryAddress) -> &'a str {
        match self {
            Self::Street => &address.street,
            Self::Number => &address.number,
            Self::Neighborhood => &address.neighborhood,
            Self::City => &address.city,
            Self::State => &address.state,
            Self::Zip => &address.zip_code,
        }
    }
}

impl fmt::Display for AddressField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressErrors(BTreeMap<AddressField, String>);

impl AddressErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: AddressField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: AddressField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = AddressField> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressField, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }

    fn insert(&mut self, field: AddressField, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }
}

impl fmt::Display for AddressErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.keys().map(AddressField::as_str).collect();
        write!(f, "{}", fields.join(", "))
    }
}

/// 8-digit postal code, optionally written `NNNNN-NNN`
pub fn is_valid_postal_code(zip: &str) -> bool {
    let zip = zip.trim();
    let bytes = zip.as_bytes();
    match bytes.len() {
        8 => bytes.iter().all(u8::is_ascii_digit),
        9 => {
            bytes[5] == b'-'
                && bytes[..5].iter().all(u8::is_ascii_digit)
                && bytes[6..].iter().all(u8::is_ascii_digit)
        }
        _ => false,
    }
}

/// Check every required field of a delivery address
pub fn validate_address(address: &DeliveryAddress) -> Result<(), AddressErrors> {
    let mut errors = AddressErrors::default();

    for field in AddressField::ALL {
        let value = field.value(address).trim();
        if value.is_empty() {
            errors.insert(field, format!("{field} is required"));
        } else if value.chars().count() > MAX_ADDRESS_FIELD_LEN {
            errors.insert(
                field,
                format!("{field} is too long (max {MAX_ADDRESS_FIELD_LEN})"),
            );
        }
    }

    if !errors.contains(AddressField::Zip) && !is_valid_postal_code(&address.zip_code) {
        errors.insert(AddressField::Zip, "zip must have 8 digits (e.g. 01310-100)");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Address form state for one checkout session
///
/// Pre-fill from a saved address makes the form read-only until the user
/// chooses to edit manually; after that, pre-fill never applies again in
/// this session.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    address: DeliveryAddress,
    prefilled_from: Option<String>,
    manual: bool,
}

impl AddressForm {
    pub fn address(&self) -> &DeliveryAddress {
        &self.address
    }

    /// Saved address id the form was filled from, while it is read-only
    pub fn prefilled_from(&self) -> Option<&str> {
        self.prefilled_from.as_deref()
    }

    pub fn is_read_only(&self) -> bool {
        self.prefilled_from.is_some()
    }

    pub fn is_manual(&self) -> bool {
        self.manual
    }

    /// Fill from the preferred saved address unless the user already typed
    ///
    /// Returns the id of the applied address.
    pub fn prefill(&mut self, saved: &[SavedAddress]) -> Option<&str> {
        if self.manual {
            return None;
        }
        let chosen = SavedAddress::pick_default(saved)?;
        self.address = chosen.address.clone();
        self.prefilled_from = Some(chosen.id.clone());
        self.prefilled_from.as_deref()
    }

    /// Unlock the fields and disable pre-fill for the rest of the session
    pub fn edit_manually(&mut self) {
        self.manual = true;
        self.prefilled_from = None;
    }

    /// Apply a user edit; returns `false` when the form is read-only
    pub fn edit(&mut self, f: impl FnOnce(&mut DeliveryAddress)) -> bool {
        if self.is_read_only() {
            return false;
        }
        self.manual = true;
        f(&mut self.address);
        true
    }

    /// Trimmed copy for the order payload
    pub fn normalized(&self) -> DeliveryAddress {
        let trim_opt = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        DeliveryAddress {
            street: self.address.street.trim().to_string(),
            number: self.address.number.trim().to_string(),
            neighborhood: self.address.neighborhood.trim().to_string(),
            city: self.address.city.trim().to_string(),
            state: self.address.state.trim().to_string(),
            zip_code: self.address.zip_code.trim().to_string(),
            complement: trim_opt(&self.address.complement),
            reference: trim_opt(&self.address.reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::AddressLabel;

    fn valid() -> DeliveryAddress {
        DeliveryAddress {
            street: "Av. Paulista".to_string(),
            number: "1000".to_string(),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: "01310-100".to_string(),
            complement: None,
            reference: None,
        }
    }

    #[test]
    fn test_postal_code_pattern() {
        assert!(is_valid_postal_code("01310100"));
        assert!(is_valid_postal_code("01310-100"));
        assert!(is_valid_postal_code(" 01310-100 "));
        assert!(!is_valid_postal_code("0131-0100"));
        assert!(!is_valid_postal_code("1310100"));
        assert!(!is_valid_postal_code("01310-10a"));
        assert!(!is_valid_postal_code("013101000"));
    }

    #[test]
    fn test_valid_address() {
        assert!(validate_address(&valid()).is_ok());
    }

    #[test]
    fn test_blank_fields_are_named() {
        let mut address = valid();
        address.number = "  ".to_string();
        address.city.clear();
        let errors = validate_address(&address).unwrap_err();
        assert_eq!(
            errors.fields().collect::<Vec<_>>(),
            vec![AddressField::Number, AddressField::City]
        );
        assert_eq!(errors.to_string(), "number, city");
    }

    #[test]
    fn test_bad_zip_is_named() {
        let mut address = valid();
        address.zip_code = "123".to_string();
        let errors = validate_address(&address).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get(AddressField::Zip).unwrap().contains("8 digits"));
    }

    #[test]
    fn test_prefill_locks_until_manual_edit() {
        let saved = vec![SavedAddress {
            id: "home-1".to_string(),
            label: AddressLabel::Home,
            is_default: true,
            address: valid(),
        }];
        let mut form = AddressForm::default();
        assert_eq!(form.prefill(&saved), Some("home-1"));
        assert!(form.is_read_only());
        assert!(!form.edit(|a| a.number = "2".into()));

        form.edit_manually();
        assert!(form.edit(|a| a.number = "2".into()));
        assert_eq!(form.address().number, "2");
        // Never re-applied once the user took over
        assert_eq!(form.prefill(&saved), None);
        assert_eq!(form.address().number, "2");
    }

    #[test]
    fn test_typing_first_disables_prefill() {
        let saved = vec![SavedAddress {
            id: "w".to_string(),
            label: AddressLabel::Work,
            is_default: false,
            address: valid(),
        }];
        let mut form = AddressForm::default();
        form.edit(|a| a.street = "Rua Nova".into());
        assert_eq!(form.prefill(&saved), None);
        assert_eq!(form.address().street, "Rua Nova");
    }
}
