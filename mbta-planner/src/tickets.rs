//! Static fare catalog and the ticket suggested for a planned trip.
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::constants::{DAY_PASS_MIN_TRANSFERS, TICKET_DAY_PASS, TICKET_SINGLE_SUBWAY};

const DEFAULT_TICKET_DATA: &str = include_str!("../assets/tickets.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    pub id: String,
    pub name: String,
    /// Dollars.
    pub price: f64,
    pub validity: String,
    pub description: String,
    #[serde(default)]
    pub recommended: bool,
}

impl TicketType {
    #[must_use]
    pub fn format_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TicketCatalog {
    #[serde(default)]
    pub tickets: Vec<TicketType>,
}

impl TicketCatalog {
    /// Parse the catalog compiled into this crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded asset is not a valid catalog.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        Self::from_json(DEFAULT_TICKET_DATA)
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        Self::embedded().unwrap_or_else(|err| {
            log::warn!("embedded ticket catalog rejected: {err}");
            Self::default()
        })
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<TicketCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a ticket catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TicketType> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Ticket to suggest for a trip.
    ///
    /// An explicit `preferred` id wins when the catalog carries it; otherwise
    /// trips with two or more transfers get the day pass and everything else
    /// a single subway ride.
    #[must_use]
    pub fn recommend(&self, transfers: u32, preferred: Option<&str>) -> Option<&TicketType> {
        if let Some(ticket) = preferred.and_then(|id| self.get(id)) {
            return Some(ticket);
        }
        self.get(recommended_ticket_id(transfers))
    }
}

/// Catalog id recommended for a trip with `transfers` changes.
#[must_use]
pub const fn recommended_ticket_id(transfers: u32) -> &'static str {
    if transfers >= DAY_PASS_MIN_TRANSFERS {
        TICKET_DAY_PASS
    } else {
        TICKET_SINGLE_SUBWAY
    }
}
