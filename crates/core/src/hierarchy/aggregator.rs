//! Hierarchy aggregation
//!
//! Sales are indexed once by seller and by override recipient, then the
//! normalized forest is walked depth-first. Total work is O(users + sales).
//! The walk keeps its own stack, so chain depth is bounded by memory only.

use std::borrow::Cow;

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use fyxed_domain::{
    ComputedShares, FyxedError, HierarchyNode, HierarchyReport, HierarchyWarning, Money, Result,
    Sale, TeamStats, User,
};
use tracing::{debug, warn};

use super::normalize::{normalize_sponsors, SponsorForest};
use crate::commission::{resolve_upline, CommissionCalculator};
use crate::directory::UserDirectory;

/// Per-user totals taken from the sale index
#[derive(Debug, Default, Clone, Copy)]
struct Earnings {
    direct_sales: u32,
    revenue: Money,
    commission: Money,
    overrides: Money,
}

/// Builds [`HierarchyReport`]s from user and sale snapshots
///
/// Sales carrying a computed block are used as stored. Sales without one are
/// split on the fly with the aggregator's calculator.
#[derive(Debug, Clone, Default)]
pub struct HierarchyAggregator {
    calculator: CommissionCalculator,
    currency: Option<String>,
}

/// Build the forest with default rates and no currency restriction
///
/// # Errors
/// `AmountOverflow` when a per-user or team total leaves `i64`.
pub fn build_hierarchy(users: &[User], sales: &[Sale]) -> Result<HierarchyReport> {
    HierarchyAggregator::default().build(users, sales)
}

impl HierarchyAggregator {
    /// Aggregator that derives missing splits with `calculator`
    pub fn new(calculator: CommissionCalculator) -> Self {
        Self { calculator, currency: None }
    }

    /// Only aggregate sales in `currency`; others become `CurrencyMismatch`
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Normalize the sponsor links, index the sales and roll up every tree
    ///
    /// Data problems become warnings on the report.
    ///
    /// # Errors
    /// `AmountOverflow` when a per-user or team total leaves `i64`.
    pub fn build(&self, users: &[User], sales: &[Sale]) -> Result<HierarchyReport> {
        let directory = UserDirectory::new(users);
        let forest = normalize_sponsors(&directory);

        let mut sale_warnings = Vec::new();
        let earnings = self.index_sales(&directory, sales, &mut sale_warnings)?;

        let mut visited: HashSet<&str> = HashSet::with_capacity(directory.len());
        let mut roots = Vec::with_capacity(forest.roots().len());
        for &root in forest.roots() {
            if visited.insert(root.id.as_str()) {
                roots.push(build_tree(root, &forest, &earnings, &mut visited)?);
            }
        }

        let unreachable: Vec<HierarchyWarning> = directory
            .users()
            .iter()
            .filter(|user| !visited.contains(user.id.as_str()) && !forest.is_excluded(&user.id))
            .map(|user| HierarchyWarning::Unreachable { user_id: user.id.clone() })
            .collect();

        let mut warnings = forest.into_warnings();
        warnings.extend(unreachable);
        warnings.extend(sale_warnings);

        for warning in &warnings {
            warn!(?warning, "Hierarchy data-integrity warning");
        }
        debug!(
            users = directory.len(),
            sales = sales.len(),
            roots = roots.len(),
            warnings = warnings.len(),
            "Hierarchy built"
        );

        Ok(HierarchyReport { roots, warnings, currency: self.currency.clone() })
    }

    fn index_sales<'a>(
        &self,
        directory: &UserDirectory<'a>,
        sales: &[Sale],
        warnings: &mut Vec<HierarchyWarning>,
    ) -> Result<HashMap<&'a str, Earnings>> {
        let mut earnings: HashMap<&'a str, Earnings> = HashMap::with_capacity(directory.len());

        for sale in sales {
            if let Some(expected) = self.currency.as_deref() {
                if !sale.currency.eq_ignore_ascii_case(expected) {
                    warnings.push(HierarchyWarning::CurrencyMismatch {
                        sale_id: sale.id.clone(),
                        currency: sale.currency.clone(),
                        expected: expected.to_string(),
                    });
                    continue;
                }
            }

            let Some(seller) = directory.get(&sale.seller_id) else {
                warnings.push(HierarchyWarning::UnknownSeller {
                    sale_id: sale.id.clone(),
                    seller_id: sale.seller_id.clone(),
                });
                continue;
            };

            let computed: Cow<'_, ComputedShares> = match &sale.computed {
                Some(computed) => Cow::Borrowed(computed),
                None => match self.derive(sale, directory) {
                    Ok(computed) => Cow::Owned(computed),
                    Err(err) => {
                        warnings.push(HierarchyWarning::UncomputableSale {
                            sale_id: sale.id.clone(),
                            reason: err.to_string(),
                        });
                        continue;
                    }
                },
            };

            let own = earnings.entry(seller.id.as_str()).or_default();
            own.direct_sales = own.direct_sales.saturating_add(1);
            own.revenue = own.revenue.try_add(sale.amount, &format!("revenue of '{}'", seller.id))?;
            own.commission = own
                .commission
                .try_add(computed.seller_share, &format!("commission of '{}'", seller.id))?;

            let overrides = [
                (computed.leader_id.as_deref(), computed.leader_share),
                (computed.sponsor_id.as_deref(), computed.sponsor_share),
            ];
            for (recipient, share) in overrides {
                let Some(recipient) = recipient else { continue };
                match directory.get(recipient) {
                    Some(user) => {
                        let entry = earnings.entry(user.id.as_str()).or_default();
                        entry.overrides = entry
                            .overrides
                            .try_add(share, &format!("overrides of '{}'", user.id))?;
                    }
                    None => warnings.push(HierarchyWarning::UnknownRecipient {
                        sale_id: sale.id.clone(),
                        user_id: recipient.to_string(),
                    }),
                }
            }
        }

        Ok(earnings)
    }

    fn derive(&self, sale: &Sale, directory: &UserDirectory<'_>) -> Result<ComputedShares> {
        let upline = resolve_upline(&sale.seller_id, directory)?;
        let split = self.calculator.compute_for(sale.amount, &upline)?;
        Ok(ComputedShares::new(split, upline))
    }
}

/// A node whose children are still being built
struct Frame<'a> {
    user: &'a User,
    level: u32,
    next_child: usize,
    children: Vec<HierarchyNode>,
}

impl<'a> Frame<'a> {
    fn new(user: &'a User, level: u32) -> Self {
        Self { user, level, next_child: 0, children: Vec::new() }
    }
}

/// Post-order walk of one tree with an explicit stack
fn build_tree<'a>(
    root: &'a User,
    forest: &SponsorForest<'a>,
    earnings: &HashMap<&'a str, Earnings>,
    visited: &mut HashSet<&'a str>,
) -> Result<HierarchyNode> {
    let mut stack = vec![Frame::new(root, 0)];

    while let Some(frame) = stack.last_mut() {
        if let Some(&child) = forest.children_of(&frame.user.id).get(frame.next_child) {
            frame.next_child += 1;
            if visited.insert(child.id.as_str()) {
                let level = frame.level.saturating_add(1);
                stack.push(Frame::new(child, level));
            }
            continue;
        }

        let Some(done) = stack.pop() else { break };
        let node = finish_node(done, earnings)?;
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => return Ok(node),
        }
    }

    Err(FyxedError::Internal(format!("hierarchy walk from '{}' ended without a root", root.id)))
}

fn finish_node(frame: Frame<'_>, earnings: &HashMap<&str, Earnings>) -> Result<HierarchyNode> {
    let Frame { user, level, children, .. } = frame;
    let overflow = |total: &str| format!("team {total} of '{}'", user.id);

    let mut team = TeamStats::default();
    for child in &children {
        team.total_members =
            team.total_members.saturating_add(1).saturating_add(child.team_stats.total_members);
        team.total_sales = team
            .total_sales
            .saturating_add(child.direct_sales)
            .saturating_add(child.team_stats.total_sales);
        team.total_revenue = team
            .total_revenue
            .try_add(child.total_revenue, &overflow("revenue"))?
            .try_add(child.team_stats.total_revenue, &overflow("revenue"))?;
        team.total_commissions = team
            .total_commissions
            .try_add(child.total_earnings, &overflow("commissions"))?
            .try_add(child.team_stats.total_commissions, &overflow("commissions"))?;
    }

    let own = earnings.get(user.id.as_str()).copied().unwrap_or_default();
    let total_earnings =
        own.commission.try_add(own.overrides, &format!("earnings of '{}'", user.id))?;

    Ok(HierarchyNode {
        user: user.clone(),
        level,
        direct_sales: own.direct_sales,
        total_revenue: own.revenue,
        total_commission: own.commission,
        override_commissions: own.overrides,
        total_earnings,
        team_stats: team,
        children,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use fyxed_domain::{BasisPoints, CommissionRates, SaleStatus, UserRole};

    use super::*;

    fn user(id: &str, role: UserRole, sponsor: Option<&str>) -> User {
        User::new(id, id, role, sponsor.map(str::to_string))
    }

    fn sale(id: &str, seller: &str, amount: i64) -> Sale {
        Sale {
            id: id.to_string(),
            seller_id: seller.to_string(),
            amount: Money::from_minor(amount),
            currency: "USD".to_string(),
            status: SaleStatus::Approved,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
            computed: None,
        }
    }

    fn money(minor: i64) -> Money {
        Money::from_minor(minor)
    }

    fn chain_users() -> Vec<User> {
        vec![
            user("owner", UserRole::Owner, None),
            user("leader-a", UserRole::Leader, Some("owner")),
            user("agent-b", UserRole::Agent, Some("leader-a")),
        ]
    }

    #[test]
    fn three_level_chain_pays_seller_leader_and_sponsor() {
        let report = build_hierarchy(&chain_users(), &[sale("s1", "agent-b", 1_000)]).unwrap();
        assert!(report.warnings.is_empty());

        let agent = report.find("agent-b").unwrap();
        assert_eq!(agent.level, 2);
        assert_eq!(agent.direct_sales, 1);
        assert_eq!(agent.total_commission, money(500));
        assert_eq!(agent.total_earnings, money(500));

        let leader = report.find("leader-a").unwrap();
        assert_eq!(leader.override_commissions, money(100));
        assert_eq!(leader.total_commission, Money::ZERO);

        let owner = report.find("owner").unwrap();
        assert_eq!(owner.override_commissions, money(100));
        assert_eq!(owner.team_stats.total_members, 2);
        assert_eq!(owner.team_stats.total_sales, 1);
        assert_eq!(owner.team_stats.total_revenue, money(1_000));
        assert_eq!(owner.team_stats.total_commissions, money(600));
    }

    #[test]
    fn stored_computed_block_is_used_as_is() {
        let mut stored = sale("s1", "agent-b", 1_000);
        stored.computed = Some(ComputedShares {
            seller_share: money(700),
            leader_id: Some("leader-a".into()),
            leader_share: money(50),
            sponsor_id: None,
            sponsor_share: Money::ZERO,
            fyxed_share: money(250),
        });

        let report = build_hierarchy(&chain_users(), &[stored]).unwrap();
        assert_eq!(report.find("agent-b").unwrap().total_commission, money(700));
        assert_eq!(report.find("leader-a").unwrap().override_commissions, money(50));
        assert_eq!(report.find("owner").unwrap().override_commissions, Money::ZERO);
    }

    #[test]
    fn derived_splits_use_aggregator_rates() {
        let rates = CommissionRates::new(
            BasisPoints::from_percent(60),
            BasisPoints::from_percent(5),
            BasisPoints::from_percent(5),
            BasisPoints::from_percent(30),
        );
        let aggregator = HierarchyAggregator::new(CommissionCalculator::new(rates).unwrap());
        let report = aggregator.build(&chain_users(), &[sale("s1", "agent-b", 1_000)]).unwrap();

        assert_eq!(report.find("agent-b").unwrap().total_commission, money(600));
        assert_eq!(report.find("leader-a").unwrap().override_commissions, money(50));
    }

    #[test]
    fn root_team_revenue_matches_subtree() {
        let users = vec![
            user("owner", UserRole::Owner, None),
            user("l1", UserRole::Leader, Some("owner")),
            user("l2", UserRole::Leader, Some("owner")),
            user("a1", UserRole::Agent, Some("l1")),
            user("a2", UserRole::Agent, Some("l1")),
            user("a3", UserRole::Agent, Some("l2")),
            user("a4", UserRole::Agent, Some("a3")),
        ];
        let sales = vec![
            sale("s1", "owner", 5_000),
            sale("s2", "l1", 1_200),
            sale("s3", "a1", 999),
            sale("s4", "a2", 301),
            sale("s5", "a4", 7_777),
            sale("s6", "a4", 10),
            sale("s7", "l2", 45),
        ];
        let report = build_hierarchy(&users, &sales).unwrap();
        let root = &report.roots[0];

        let descendants: Vec<&HierarchyNode> = root.iter().skip(1).collect();
        let revenue = Money::checked_sum(descendants.iter().map(|node| node.total_revenue));
        let earnings = Money::checked_sum(descendants.iter().map(|node| node.total_earnings));
        let sales_count: u32 = descendants.iter().map(|node| node.direct_sales).sum();

        assert_eq!(Some(root.team_stats.total_revenue), revenue);
        assert_eq!(Some(root.team_stats.total_commissions), earnings);
        assert_eq!(root.team_stats.total_sales, sales_count);
        assert_eq!(root.team_stats.total_members, 6);

        let whole_tree = Money::checked_sum(root.iter().map(|node| node.total_revenue));
        assert_eq!(root.total_revenue.checked_add(root.team_stats.total_revenue), whole_tree);
        assert_eq!(whole_tree, Money::checked_sum(sales.iter().map(|s| s.amount)));
    }

    #[test]
    fn orphan_is_attached_under_first_owner() {
        let users = vec![
            user("agent-x", UserRole::Agent, None),
            user("owner-1", UserRole::Owner, None),
            user("owner-2", UserRole::Owner, None),
        ];
        let report = build_hierarchy(&users, &[]).unwrap();

        assert_eq!(report.roots.len(), 2);
        assert_eq!(report.roots[0].children[0].id(), "agent-x");
        assert_eq!(report.roots[0].children[0].level, 1);
        assert!(report.roots[1].children.is_empty());
        assert!(users[0].sponsor_id.is_none());
    }

    #[test]
    fn orphan_sales_pay_no_override_to_display_parent() {
        let users = vec![
            user("owner", UserRole::Owner, None),
            user("orphan", UserRole::Agent, None),
        ];
        let report = build_hierarchy(&users, &[sale("s1", "orphan", 1_000)]).unwrap();
        assert_eq!(report.find("owner").unwrap().override_commissions, Money::ZERO);
        assert_eq!(report.find("orphan").unwrap().total_commission, money(500));
    }

    #[test]
    fn dangling_sponsor_and_descendants_are_reported() {
        let users = vec![
            user("owner", UserRole::Owner, None),
            user("lost", UserRole::Leader, Some("deleted")),
            user("below-lost", UserRole::Agent, Some("lost")),
        ];
        let report = build_hierarchy(&users, &[]).unwrap();

        assert_eq!(report.node_count(), 1);
        assert_eq!(
            report.warnings,
            vec![
                HierarchyWarning::DanglingSponsor {
                    user_id: "lost".into(),
                    sponsor_id: "deleted".into()
                },
                HierarchyWarning::Unreachable { user_id: "below-lost".into() },
            ]
        );
    }

    #[test]
    fn sponsor_cycles_terminate_and_are_unreachable() {
        let users = vec![
            user("owner", UserRole::Owner, None),
            user("x", UserRole::Agent, Some("y")),
            user("y", UserRole::Agent, Some("x")),
            user("me", UserRole::Agent, Some("me")),
        ];
        let report = build_hierarchy(&users, &[sale("s1", "x", 100)]).unwrap();

        assert_eq!(report.node_count(), 1);
        assert!(report.warnings.contains(&HierarchyWarning::Unreachable { user_id: "x".into() }));
        assert!(report.warnings.contains(&HierarchyWarning::Unreachable { user_id: "y".into() }));
        assert!(report.warnings.contains(&HierarchyWarning::Unreachable { user_id: "me".into() }));
        assert!(report.warnings.iter().any(|w| matches!(
            w,
            HierarchyWarning::UncomputableSale { sale_id, .. } if sale_id == "s1"
        )));
    }

    #[test]
    fn unknown_seller_and_recipient_are_reported() {
        let mut foreign = sale("s2", "agent-b", 1_000);
        foreign.computed = Some(ComputedShares {
            seller_share: money(500),
            leader_id: Some("gone".into()),
            leader_share: money(100),
            sponsor_id: None,
            sponsor_share: Money::ZERO,
            fyxed_share: money(400),
        });
        let report =
            build_hierarchy(&chain_users(), &[sale("s1", "ghost", 10), foreign]).unwrap();

        assert_eq!(
            report.warnings,
            vec![
                HierarchyWarning::UnknownSeller { sale_id: "s1".into(), seller_id: "ghost".into() },
                HierarchyWarning::UnknownRecipient { sale_id: "s2".into(), user_id: "gone".into() },
            ]
        );
        assert_eq!(report.find("agent-b").unwrap().total_revenue, money(1_000));
    }

    #[test]
    fn currency_filter_skips_other_currencies() {
        let mut euro = sale("s2", "agent-b", 4_000);
        euro.currency = "EUR".into();
        let aggregator = HierarchyAggregator::default().with_currency("USD");
        let report =
            aggregator.build(&chain_users(), &[sale("s1", "agent-b", 1_000), euro]).unwrap();

        assert_eq!(report.currency.as_deref(), Some("USD"));
        assert_eq!(report.find("agent-b").unwrap().total_revenue, money(1_000));
        assert_eq!(
            report.warnings,
            vec![HierarchyWarning::CurrencyMismatch {
                sale_id: "s2".into(),
                currency: "EUR".into(),
                expected: "USD".into()
            }]
        );
    }

    #[test]
    fn identical_snapshots_build_identical_trees() {
        let users = chain_users();
        let sales = vec![sale("s1", "agent-b", 1_000), sale("s2", "leader-a", 333)];
        let first = build_hierarchy(&users, &sales).unwrap();
        assert_eq!(first, build_hierarchy(&users, &sales).unwrap());
    }

    #[test]
    fn revenue_past_i64_is_an_error() {
        let big = i64::MAX / 2 + 1;
        let sales = vec![sale("s1", "agent-b", big), sale("s2", "agent-b", big)];

        let err = build_hierarchy(&chain_users(), &sales).unwrap_err();
        assert!(matches!(&err, FyxedError::AmountOverflow(message) if message.contains("agent-b")));
    }

    #[test]
    fn team_rollup_past_i64_is_an_error() {
        let big = i64::MAX / 2 + 1;
        let users = vec![
            user("owner", UserRole::Owner, None),
            user("left", UserRole::Agent, Some("owner")),
            user("right", UserRole::Agent, Some("owner")),
        ];
        let sales = vec![sale("s1", "left", big), sale("s2", "right", big)];

        let err = build_hierarchy(&users, &sales).unwrap_err();
        assert!(matches!(&err, FyxedError::AmountOverflow(message) if message.contains("owner")));
    }

    #[test]
    fn deep_chain_builds_on_a_small_stack() {
        const DEPTH: usize = 20_000;

        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let mut users = vec![user("u0", UserRole::Owner, None)];
                for i in 1..DEPTH {
                    let sponsor = format!("u{}", i - 1);
                    users.push(user(&format!("u{i}"), UserRole::Agent, Some(&sponsor)));
                }
                let last = format!("u{}", DEPTH - 1);
                let report = build_hierarchy(&users, &[sale("s1", &last, 1_000)]).unwrap();

                let root = &report.roots[0];
                assert_eq!(root.team_stats.total_members as usize, DEPTH - 1);
                assert_eq!(root.team_stats.total_revenue, money(1_000));
                assert_eq!(root.team_stats.total_sales, 1);

                let seller = report.find(&last).unwrap();
                assert_eq!(seller.level as usize, DEPTH - 1);
                assert_eq!(seller.total_commission, money(500));
                assert!(report.warnings.is_empty());
            })
            .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn empty_snapshot_builds_empty_report() {
        let report = build_hierarchy(&[], &[]).unwrap();
        assert!(report.roots.is_empty());
        assert!(report.warnings.is_empty());
    }
}
