//! Upline resolution for payment
//!
//! Uses stored sponsor links only. The orphan-to-first-owner rule belongs to
//! the hierarchy view and never decides who gets paid.

use fyxed_domain::{FyxedError, Result, Upline};

use crate::directory::UserDirectory;

/// Resolve the leader (seller's sponsor) and sponsor (leader's sponsor)
///
/// # Errors
/// - `NotFound` when the seller is not in the directory
/// - `DanglingReference` when a sponsor link points to a missing user
/// - `SponsorCycle` when the seller would pay themselves or the leader
///   sponsors themselves
pub fn resolve_upline(seller_id: &str, directory: &UserDirectory<'_>) -> Result<Upline> {
    let seller = directory
        .get(seller_id)
        .ok_or_else(|| FyxedError::NotFound(format!("seller '{seller_id}'")))?;

    let Some(leader_id) = seller.sponsor_id.as_deref() else {
        return Ok(Upline::default());
    };
    if leader_id == seller.id {
        return Err(FyxedError::SponsorCycle(seller.id.clone()));
    }
    let leader = directory
        .get(leader_id)
        .ok_or_else(|| FyxedError::dangling_sponsor(&seller.id, leader_id))?;

    let sponsor_id = match leader.sponsor_id.as_deref() {
        None => None,
        Some(id) if id == seller.id => return Err(FyxedError::SponsorCycle(seller.id.clone())),
        Some(id) if id == leader.id => return Err(FyxedError::SponsorCycle(leader.id.clone())),
        Some(id) if !directory.contains(id) => {
            return Err(FyxedError::dangling_sponsor(&leader.id, id));
        }
        Some(id) => Some(id.to_string()),
    };

    Ok(Upline { leader_id: Some(leader.id.clone()), sponsor_id })
}

#[cfg(test)]
mod tests {
    use fyxed_domain::{User, UserRole};

    use super::*;

    fn user(id: &str, role: UserRole, sponsor: Option<&str>) -> User {
        User::new(id, id, role, sponsor.map(str::to_string))
    }

    fn chain() -> Vec<User> {
        vec![
            user("owner", UserRole::Owner, None),
            user("leader", UserRole::Leader, Some("owner")),
            user("agent", UserRole::Agent, Some("leader")),
            user("orphan", UserRole::Agent, None),
        ]
    }

    #[test]
    fn resolves_two_levels() {
        let users = chain();
        let directory = UserDirectory::new(&users);

        let upline = resolve_upline("agent", &directory).unwrap();
        assert_eq!(upline.leader_id.as_deref(), Some("leader"));
        assert_eq!(upline.sponsor_id.as_deref(), Some("owner"));

        let upline = resolve_upline("leader", &directory).unwrap();
        assert_eq!(upline.leader_id.as_deref(), Some("owner"));
        assert_eq!(upline.sponsor_id, None);
    }

    #[test]
    fn orphan_has_no_upline() {
        let users = chain();
        let directory = UserDirectory::new(&users);
        assert_eq!(resolve_upline("orphan", &directory).unwrap(), Upline::default());
        assert_eq!(resolve_upline("owner", &directory).unwrap(), Upline::default());
    }

    #[test]
    fn unknown_seller_is_not_found() {
        let users = chain();
        let directory = UserDirectory::new(&users);
        assert!(matches!(resolve_upline("nobody", &directory), Err(FyxedError::NotFound(_))));
    }

    #[test]
    fn dangling_links_are_errors() {
        let users = vec![
            user("a", UserRole::Agent, Some("ghost")),
            user("l", UserRole::Leader, Some("ghost")),
            user("b", UserRole::Agent, Some("l")),
        ];
        let directory = UserDirectory::new(&users);

        assert_eq!(
            resolve_upline("a", &directory),
            Err(FyxedError::dangling_sponsor("a", "ghost"))
        );
        assert_eq!(
            resolve_upline("b", &directory),
            Err(FyxedError::dangling_sponsor("l", "ghost"))
        );
    }

    #[test]
    fn cycles_are_errors() {
        let users = vec![
            user("self", UserRole::Agent, Some("self")),
            user("x", UserRole::Agent, Some("y")),
            user("y", UserRole::Leader, Some("x")),
            user("loop", UserRole::Leader, Some("loop")),
            user("z", UserRole::Agent, Some("loop")),
        ];
        let directory = UserDirectory::new(&users);

        assert_eq!(resolve_upline("self", &directory), Err(FyxedError::SponsorCycle("self".into())));
        assert_eq!(resolve_upline("x", &directory), Err(FyxedError::SponsorCycle("x".into())));
        assert_eq!(resolve_upline("z", &directory), Err(FyxedError::SponsorCycle("loop".into())));
    }
}
