//! Product Model

use serde::{Deserialize, Serialize};

/// Customization category tag (display grouping only, no pricing effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomizationCategory {
    Base,
    Protein,
    Topping,
    Sauce,
    Extra,
}

/// How a customization is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionKind {
    /// Counted modifier (0..N), priced per unit
    Quantity,
    /// On/off modifier, priced once when present
    Boolean,
}

/// Customization definition (embedded in Product)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub id: String,
    pub name: String,
    pub category: CustomizationCategory,
    /// Price per unit in currency unit (e.g., 3.00)
    pub unit_price: f64,
    pub selection_kind: SelectionKind,
    /// Selection group; boolean customizations sharing a non-empty group are
    /// mutually exclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl Customization {
    pub fn is_boolean(&self) -> bool {
        self.selection_kind == SelectionKind::Boolean
    }

    /// Radio group this customization belongs to, if any
    ///
    /// Only boolean customizations with a non-empty group are exclusive;
    /// quantity customizations ignore `group`.
    pub fn exclusive_group(&self) -> Option<&str> {
        if !self.is_boolean() {
            return None;
        }
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Base price in currency unit
    pub base_price: f64,
    /// Customization definitions, in display order
    #[serde(default)]
    pub customizations: Vec<Customization>,
    pub is_active: bool,
}

impl Product {
    /// Look up a customization definition by id
    pub fn customization(&self, id: &str) -> Option<&Customization> {
        self.customizations.iter().find(|c| c.id == id)
    }

    /// Boolean customizations sharing the given exclusive group
    pub fn group_members<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a Customization> {
        self.customizations
            .iter()
            .filter(move |c| c.exclusive_group() == Some(group))
    }
}
