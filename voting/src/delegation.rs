//! Vote delegation: entrust voting weight to a delegate.
//!
//! Delegation is a single hop: a delegator holds at most one outgoing edge and
//! its own weight is added to the delegate's running total. Each edge remembers
//! the exact weight it added so that revoking it subtracts the same amount,
//! whatever the voter's weight has become in the meantime.

use agora_types::{Address, Height, Weight};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::VotingError;

/// A recorded delegator → delegate edge.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationEdge {
    pub delegator: Address,
    pub delegate: Address,
    /// Weight added to the delegate when the edge was created.
    pub weight: Weight,
    pub since: Height,
}

/// Delegation edges of the current session plus accumulated weight per delegate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DelegationGraph {
    /// delegator → edge.
    edges: HashMap<Address, DelegationEdge>,
    /// Reverse index: delegate → set of direct delegators.
    reverse: HashMap<Address, BTreeSet<Address>>,
    /// delegate → accumulated delegated weight.
    received: HashMap<Address, Weight>,
}

impl DelegationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `from` → `to`, adding `weight` to `to`'s accumulated weight.
    pub fn delegate(
        &mut self,
        from: &Address,
        to: &Address,
        weight: Weight,
        now: Height,
    ) -> Result<(), VotingError> {
        if from == to {
            return Err(VotingError::SelfDelegation);
        }
        if self.edges.contains_key(from) {
            return Err(VotingError::AlreadyDelegated(from.clone()));
        }
        let total = self
            .received(to)
            .checked_add(weight)
            .ok_or(VotingError::Overflow)?;

        self.received.insert(to.clone(), total);
        self.reverse
            .entry(to.clone())
            .or_default()
            .insert(from.clone());
        self.edges.insert(
            from.clone(),
            DelegationEdge {
                delegator: from.clone(),
                delegate: to.clone(),
                weight,
                since: now,
            },
        );
        Ok(())
    }

    /// Remove `from`'s edge and subtract exactly the weight it added.
    pub fn revoke(&mut self, from: &Address) -> Result<DelegationEdge, VotingError> {
        let edge = self
            .edges
            .remove(from)
            .ok_or_else(|| VotingError::NotFound(format!("delegation from {from}")))?;

        let remaining = self.received(&edge.delegate).saturating_sub(edge.weight);
        if remaining == 0 {
            self.received.remove(&edge.delegate);
        } else {
            self.received.insert(edge.delegate.clone(), remaining);
        }
        if let Some(set) = self.reverse.get_mut(&edge.delegate) {
            set.remove(from);
            if set.is_empty() {
                self.reverse.remove(&edge.delegate);
            }
        }
        Ok(edge)
    }

    /// Weight delegated to `delegate` by others.
    pub fn received(&self, delegate: &Address) -> Weight {
        self.received.get(delegate).copied().unwrap_or(0)
    }

    /// The outgoing edge of `delegator`, if any.
    pub fn edge(&self, delegator: &Address) -> Option<&DelegationEdge> {
        self.edges.get(delegator)
    }

    /// All wallets that directly delegated to `delegate`, in address order.
    pub fn delegators_of(&self, delegate: &Address) -> Vec<&Address> {
        self.reverse
            .get(delegate)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn clear(&mut self) {
        self.edges.clear();
        self.reverse.clear();
        self.received.clear();
    }
}
