//! Resource kinds and the colony ledger.
//!
//! The ledger never holds a negative quantity. Consumption that cannot be
//! fully covered floors the stock at zero and reports the shortage so the
//! turn engine can apply starvation and dehydration penalties.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Every resource the colony tracks. Closed set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ResourceKind {
    /// Eaten once per survivor per day.
    Food,
    /// Drunk once per survivor per day.
    Water,
    /// Medical supplies.
    Medicine,
    /// Raw construction stock.
    BuildingMaterials,
    /// Power cells and fuel.
    Energy,
}

impl ResourceKind {
    /// All kinds in ledger order.
    pub const ALL: [Self; 5] = [
        Self::Food,
        Self::Water,
        Self::Medicine,
        Self::BuildingMaterials,
        Self::Energy,
    ];

    /// Display label used in day log lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Water => "Water",
            Self::Medicine => "Medicine",
            Self::BuildingMaterials => "Building Materials",
            Self::Energy => "Energy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fixed bundle of resources, e.g. a building cost.
pub type ResourceBundle = BTreeMap<ResourceKind, u32>;

/// Resource kind to non-negative quantity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLedger {
    stock: BTreeMap<ResourceKind, u32>,
}

impl ResourceLedger {
    /// Create a ledger with every kind at zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stock: ResourceKind::ALL.iter().map(|&kind| (kind, 0)).collect(),
        }
    }

    /// Create a ledger seeded from a bundle. Kinds not named start at zero.
    #[must_use]
    pub fn from_bundle(bundle: &ResourceBundle) -> Self {
        let mut ledger = Self::new();
        for (&kind, &amount) in bundle {
            ledger.credit(kind, amount);
        }
        ledger
    }

    /// Current quantity of `kind`.
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> u32 {
        self.stock.get(&kind).copied().unwrap_or(0)
    }

    /// Add `amount` of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] if `amount` is negative; the
    /// ledger is left unchanged.
    pub fn add(&mut self, kind: ResourceKind, amount: i32) -> Result<()> {
        let amount = u32::try_from(amount).map_err(|_| {
            GameError::InvalidArgument(format!("cannot add negative amount {amount} of {kind}"))
        })?;
        self.credit(kind, amount);
        Ok(())
    }

    /// Add an already non-negative amount.
    pub fn credit(&mut self, kind: ResourceKind, amount: u32) {
        let entry = self.stock.entry(kind).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Consume `amount` of `kind`.
    ///
    /// Returns `true` if the full amount was available. Otherwise the stock
    /// is set to zero and `false` is returned.
    pub fn consume(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let entry = self.stock.entry(kind).or_insert(0);
        if *entry >= amount {
            *entry -= amount;
            true
        } else {
            *entry = 0;
            false
        }
    }

    /// Remove up to `amount` of `kind`, returning how much was removed.
    pub fn take_up_to(&mut self, kind: ResourceKind, amount: u32) -> u32 {
        let entry = self.stock.entry(kind).or_insert(0);
        let taken = amount.min(*entry);
        *entry -= taken;
        taken
    }

    /// Check whether every entry of `cost` is covered.
    #[must_use]
    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        self.first_shortfall(cost).is_none()
    }

    /// Deduct an entire bundle, or nothing at all.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InsufficientResources`] naming the first kind
    /// that falls short. No resource is deducted in that case.
    pub fn spend(&mut self, cost: &ResourceBundle) -> Result<()> {
        if let Some((resource, required, available)) = self.first_shortfall(cost) {
            return Err(GameError::InsufficientResources {
                resource,
                required,
                available,
            });
        }
        for (&kind, &amount) in cost {
            let covered = self.consume(kind, amount);
            debug_assert!(covered, "spend checked affordability first");
        }
        Ok(())
    }

    /// Iterate over all kinds and quantities in ledger order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, u32)> + '_ {
        self.stock.iter().map(|(&kind, &amount)| (kind, amount))
    }

    fn first_shortfall(&self, cost: &ResourceBundle) -> Option<(ResourceKind, u32, u32)> {
        cost.iter().find_map(|(&kind, &required)| {
            let available = self.get(kind);
            (available < required).then_some((kind, required, available))
        })
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}
