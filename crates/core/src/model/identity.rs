use crate::model::ids::UserId;

const ADMIN_GROUP: &str = "Admin";

/// Caller identity as supplied by the identity provider.
///
/// The core only reads it; sessions and tokens live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    user_id: UserId,
    groups: Vec<String>,
}

impl UserIdentity {
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = String>) -> Self {
        self.groups = groups
            .into_iter()
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        self
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    /// Whether the view should offer admin screens. Not an authorization check.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.in_group(ADMIN_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_membership_comes_from_groups() {
        let user = UserId::new("ana").unwrap();
        let plain = UserIdentity::new(user.clone());
        assert!(!plain.is_admin());

        let admin = UserIdentity::new(user).with_groups(vec![" Admin ".to_string(), String::new()]);
        assert!(admin.is_admin());
        assert_eq!(admin.groups().len(), 1);
    }
}
