//! Read-side projection of the sponsor tree
//!
//! Rebuilt from a user/sale snapshot on every request and never persisted.

use serde::{Deserialize, Serialize};
#[cfg(feature = "ts-gen")]
use ts_rs::TS;

use super::money::Money;
use super::user::User;

/// Rollup over every descendant of a node (the node itself excluded)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct TeamStats {
    pub total_members: u32,
    pub total_sales: u32,
    pub total_revenue: Money,
    /// Sum of `total_earnings` across descendants
    pub total_commissions: Money,
}

/// One user in the tree with personal and override earnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct HierarchyNode {
    pub user: User,
    /// Depth from the root, roots are 0
    pub level: u32,
    pub direct_sales: u32,
    pub total_revenue: Money,
    /// Seller shares from the user's own sales
    pub total_commission: Money,
    /// Leader and sponsor shares earned from the downline
    pub override_commissions: Money,
    pub total_earnings: Money,
    pub team_stats: TeamStats,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    /// Depth-first search of this subtree
    pub fn find(&self, user_id: &str) -> Option<&Self> {
        self.iter().find(|node| node.user.id == user_id)
    }

    /// Pre-order iterator over this node and all descendants
    pub fn iter(&self) -> impl Iterator<Item = &Self> + '_ {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Sponsor chains can be arbitrarily deep, so children are released from a
/// heap stack instead of by recursive drops.
impl Drop for HierarchyNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Data-integrity problems found while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyWarning {
    /// The user's sponsor does not exist, so the user is left out of the tree
    DanglingSponsor { user_id: String, sponsor_id: String },
    /// No path from any owner reaches the user (cycles, dropped ancestors,
    /// orphans with no owner)
    Unreachable { user_id: String },
    /// Later records with an already seen id are ignored
    DuplicateUser { user_id: String },
    UnknownSeller { sale_id: String, seller_id: String },
    /// A computed leader/sponsor id is not in the tree
    UnknownRecipient { sale_id: String, user_id: String },
    CurrencyMismatch { sale_id: String, currency: String, expected: String },
    UncomputableSale { sale_id: String, reason: String },
}

/// Forest of owner-rooted trees plus everything that did not fit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-gen", derive(TS))]
#[cfg_attr(feature = "ts-gen", ts(export))]
pub struct HierarchyReport {
    pub roots: Vec<HierarchyNode>,
    pub warnings: Vec<HierarchyWarning>,
    /// Report currency when the aggregation was restricted to one
    pub currency: Option<String>,
}

impl HierarchyReport {
    /// Subtree rooted at `user_id`
    pub fn find(&self, user_id: &str) -> Option<&HierarchyNode> {
        self.roots.iter().find_map(|root| root.find(user_id))
    }

    /// Detach the subtree rooted at `user_id`, dropping the rest
    pub fn into_subtree(mut self, user_id: &str) -> Option<HierarchyNode> {
        let path = self.path_to(user_id)?;
        let (&last, parents) = path.split_last()?;

        let mut siblings = &mut self.roots;
        for &index in parents {
            siblings = &mut siblings.get_mut(index)?.children;
        }
        (last < siblings.len()).then(|| siblings.swap_remove(last))
    }

    /// Child indices leading from the roots to `user_id`
    fn path_to(&self, user_id: &str) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut stack: Vec<(usize, usize, &HierarchyNode)> =
            self.roots.iter().enumerate().rev().map(|(index, root)| (0, index, root)).collect();

        while let Some((depth, index, node)) = stack.pop() {
            path.truncate(depth);
            path.push(index);
            if node.user.id == user_id {
                return Some(path);
            }
            stack.extend(
                node.children.iter().enumerate().rev().map(|(i, child)| (depth + 1, i, child)),
            );
        }
        None
    }

    /// Every node in the forest, pre-order
    pub fn nodes(&self) -> impl Iterator<Item = &HierarchyNode> + '_ {
        self.roots.iter().flat_map(HierarchyNode::iter)
    }

    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }
}
