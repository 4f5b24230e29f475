//! Address Models

use serde::{Deserialize, Serialize};

/// Delivery address, required in full only for delivery orders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Saved address label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressLabel {
    Home,
    Work,
    Other,
}

/// Address from the customer's address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAddress {
    pub id: String,
    pub label: AddressLabel,
    #[serde(default)]
    pub is_default: bool,
    #[serde(flatten)]
    pub address: DeliveryAddress,
}

impl SavedAddress {
    /// Pick the address used for checkout pre-fill
    ///
    /// Order of preference: work when work is flagged default, then home,
    /// then any address flagged default, then the first saved address.
    pub fn pick_default(addresses: &[SavedAddress]) -> Option<&SavedAddress> {
        let work_default = addresses
            .iter()
            .find(|a| a.label == AddressLabel::Work && a.is_default);
        let home = addresses.iter().find(|a| a.label == AddressLabel::Home);
        let flagged = addresses.iter().find(|a| a.is_default);

        work_default
            .or(home)
            .or(flagged)
            .or_else(|| addresses.first())
    }
}
