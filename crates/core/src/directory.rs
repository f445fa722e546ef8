//! Id index over a user snapshot

use ahash::AHashMap as HashMap;
use fyxed_domain::User;

/// Borrowed lookup table over a user list
///
/// The first record for an id wins. Later duplicates are kept aside so the
/// hierarchy view can report them.
#[derive(Debug, Default)]
pub struct UserDirectory<'a> {
    by_id: HashMap<&'a str, &'a User>,
    ordered: Vec<&'a User>,
    duplicates: Vec<&'a str>,
}

impl<'a> UserDirectory<'a> {
    /// Index `users` by id; the first occurrence of a repeated id wins
    pub fn new(users: &'a [User]) -> Self {
        let mut by_id = HashMap::with_capacity(users.len());
        let mut ordered = Vec::with_capacity(users.len());
        let mut duplicates = Vec::new();

        for user in users {
            if by_id.contains_key(user.id.as_str()) {
                duplicates.push(user.id.as_str());
            } else {
                by_id.insert(user.id.as_str(), user);
                ordered.push(user);
            }
        }

        Self { by_id, ordered, duplicates }
    }

    /// Look up a user by exact id
    pub fn get(&self, id: &str) -> Option<&'a User> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Unique users in input order
    pub fn users(&self) -> &[&'a User] {
        &self.ordered
    }

    /// Ids seen more than once, once per extra occurrence
    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Number of unique users
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
