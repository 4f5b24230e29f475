//! Actor Model
//!
//! The authenticated identity consumed from the auth layer. It scopes both
//! checkout (address pre-fill) and the realtime subscription filter.

use serde::{Deserialize, Serialize};

/// Current actor identity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Actor {
    #[default]
    Anonymous,
    Customer {
        id: String,
    },
    Merchant {
        id: String,
        store_ids: Vec<String>,
    },
}

impl Actor {
    pub fn customer(id: impl Into<String>) -> Self {
        Self::Customer { id: id.into() }
    }

    pub fn merchant(id: impl Into<String>, store_ids: Vec<String>) -> Self {
        Self::Merchant {
            id: id.into(),
            store_ids,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn customer_id(&self) -> Option<&str> {
        match self {
            Self::Customer { id } => Some(id),
            _ => None,
        }
    }

    /// Store ids owned by a merchant actor (empty otherwise)
    pub fn store_ids(&self) -> &[String] {
        match self {
            Self::Merchant { store_ids, .. } => store_ids,
            _ => &[],
        }
    }
}
