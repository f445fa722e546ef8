//! Sponsor normalization pass
//!
//! Turns stored sponsor links into parent edges for display:
//! - every owner is a root, in input order, and is never attached below
//!   anyone
//! - a non-owner with a known sponsor hangs under that sponsor
//! - a non-owner without a sponsor hangs under the first owner
//! - a non-owner whose sponsor is missing is left out with a
//!   `DanglingSponsor` warning
//!
//! Nothing is written back; the stored records stay as they are.

use ahash::{AHashMap as HashMap, AHashSet as HashSet};
use fyxed_domain::{HierarchyWarning, User};

use crate::directory::UserDirectory;

/// Parent edges produced by [`normalize_sponsors`]
#[derive(Debug, Default)]
pub struct SponsorForest<'a> {
    roots: Vec<&'a User>,
    children: HashMap<&'a str, Vec<&'a User>>,
    excluded: HashSet<&'a str>,
    warnings: Vec<HierarchyWarning>,
}

impl<'a> SponsorForest<'a> {
    /// Owners in input order
    pub fn roots(&self) -> &[&'a User] {
        &self.roots
    }

    /// Children of `id` in input order
    pub fn children_of(&self, id: &str) -> &[&'a User] {
        self.children.get(id).map_or(&[][..], Vec::as_slice)
    }

    /// Users left out during normalization (already warned about)
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded.contains(id)
    }

    /// Duplicate, dangling and unreachable users found while normalizing
    pub fn warnings(&self) -> &[HierarchyWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<HierarchyWarning> {
        self.warnings
    }
}

/// Build parent edges from a directory
pub fn normalize_sponsors<'a>(directory: &UserDirectory<'a>) -> SponsorForest<'a> {
    let mut forest = SponsorForest::default();

    for duplicate in directory.duplicates() {
        forest.warnings.push(HierarchyWarning::DuplicateUser { user_id: (*duplicate).to_string() });
    }

    forest.roots = directory.users().iter().copied().filter(|user| user.is_owner()).collect();
    let first_owner = forest.roots.first().copied().map(|owner| owner.id.as_str());

    for &user in directory.users() {
        if user.is_owner() {
            continue;
        }

        let parent = match user.sponsor_id.as_deref() {
            Some(sponsor_id) if directory.contains(sponsor_id) => sponsor_id,
            Some(sponsor_id) => {
                forest.excluded.insert(user.id.as_str());
                forest.warnings.push(HierarchyWarning::DanglingSponsor {
                    user_id: user.id.clone(),
                    sponsor_id: sponsor_id.to_string(),
                });
                continue;
            }
            None => match first_owner {
                Some(owner_id) => owner_id,
                None => {
                    forest.excluded.insert(user.id.as_str());
                    forest.warnings.push(HierarchyWarning::Unreachable { user_id: user.id.clone() });
                    continue;
                }
            },
        };

        forest.children.entry(parent).or_default().push(user);
    }

    forest
}
