//! # Cart Gate
//!
//! Hands a finished build to the cart collaborator.
//!
//! The engine itself never blocks on compatibility issues. Whether a build with
//! issues may be added is a [`CartPolicy`] chosen by the caller; the storefront
//! checkout uses [`CartPolicy::BlockOnIssues`].

use crate::configurator::Configurator;
use crate::{CategoryId, Component, Price, SetupError, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a build that still has issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CartPolicy {
    AllowIssues,
    #[default]
    BlockOnIssues,
}

impl CartPolicy {
    #[must_use]
    pub fn from_block_flag(block_on_issues: bool) -> Self {
        if block_on_issues {
            CartPolicy::BlockOnIssues
        } else {
            CartPolicy::AllowIssues
        }
    }
}

/// The full selection plus its derived total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    pub components: BTreeMap<CategoryId, Component>,
    pub total_price: Price,
}

impl CartRequest {
    /// Build a cart request from the session, enforcing `policy`.
    pub fn from_configurator(
        configurator: &Configurator,
        policy: CartPolicy,
    ) -> Result<Self, SetupError> {
        let selection = configurator.selection();
        if selection.is_empty() {
            return Err(SetupError::EmptySelection);
        }
        let issues = configurator.issues().len();
        if policy == CartPolicy::BlockOnIssues && issues > 0 {
            return Err(SetupError::IssuesPresent(issues));
        }
        Ok(Self {
            components: selection.clone().into(),
            total_price: selection.total_price(),
        })
    }
}

/// Receives cart additions.
pub trait CartSink: Send + Sync {
    fn add(&mut self, user: &UserId, request: CartRequest) -> Result<(), SetupError>;
}

/// Per-user cart contents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCart {
    carts: BTreeMap<UserId, Vec<CartRequest>>,
}

impl MemoryCart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests added by `user`, oldest first.
    #[must_use]
    pub fn items(&self, user: &UserId) -> &[CartRequest] {
        self.carts.get(user).map(Vec::as_slice).unwrap_or_default()
    }

    /// Sum over every request in the user's cart.
    #[must_use]
    pub fn total(&self, user: &UserId) -> Price {
        self.items(user).iter().map(|r| r.total_price).sum()
    }
}

impl CartSink for MemoryCart {
    fn add(&mut self, user: &UserId, request: CartRequest) -> Result<(), SetupError> {
        tracing::info!(
            user = %user,
            components = request.components.len(),
            total = %request.total_price,
            "build added to cart"
        );
        self.carts.entry(user.clone()).or_default().push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Catalog;

    fn conflicted() -> Configurator {
        let mut cfg = Configurator::new(Catalog::new());
        cfg.select_component(
            CategoryId::Cpu,
            Component::new("c", CategoryId::Cpu, "CPU", Price(30_000)).with_spec("socket", "AM5"),
        );
        cfg.select_component(
            CategoryId::Motherboard,
            Component::new("m", CategoryId::Motherboard, "Board", Price(15_000))
                .with_spec("socket", "AM4"),
        );
        cfg
    }

    #[test]
    fn empty_selection_rejected() {
        let cfg = Configurator::new(Catalog::new());
        assert!(matches!(
            CartRequest::from_configurator(&cfg, CartPolicy::AllowIssues),
            Err(SetupError::EmptySelection)
        ));
    }

    #[test]
    fn policy_decides_on_issues() {
        let cfg = conflicted();
        assert!(matches!(
            CartRequest::from_configurator(&cfg, CartPolicy::BlockOnIssues),
            Err(SetupError::IssuesPresent(1))
        ));

        let request =
            CartRequest::from_configurator(&cfg, CartPolicy::AllowIssues).expect("allowed");
        assert_eq!(request.total_price, Price(45_000));
        assert_eq!(request.components.len(), 2);
    }

    #[test]
    fn memory_cart_accumulates_per_user() {
        let cfg = conflicted();
        let mut cart = MemoryCart::new();
        let user = UserId::new("shopper");
        let request =
            CartRequest::from_configurator(&cfg, CartPolicy::AllowIssues).expect("allowed");
        cart.add(&user, request.clone()).expect("add");
        cart.add(&user, request).expect("add");

        assert_eq!(cart.items(&user).len(), 2);
        assert_eq!(cart.total(&user), Price(90_000));
        assert!(cart.items(&UserId::new("other")).is_empty());
    }
}
