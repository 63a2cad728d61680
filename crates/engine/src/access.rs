//! Document visibility and group membership for a connector.
//!
//! [`Visibility`] makes "public" and "restricted to groups" mutually
//! exclusive: a public connector has no group set to hold stale ids.
//! [`GroupAccess`] layers the viewer's role and the available groups on top
//! and enforces the selection rules for non-administrators.

use conform_types::UserGroup;
use indexmap::IndexSet;
use tracing::debug;

use crate::session::SessionState;

/// Who can see the documents indexed by a connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Restricted(IndexSet<i64>),
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Restricted(IndexSet::new())
    }
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }

    /// Selected group ids; always empty for public connectors.
    pub fn group_ids(&self) -> Vec<i64> {
        match self {
            Visibility::Public => Vec::new(),
            Visibility::Restricted(ids) => ids.iter().copied().collect(),
        }
    }
}

/// Role of the person editing the form, as far as it is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewer {
    /// Session still loading or no signed-in user.
    #[default]
    Unknown,
    Admin,
    Member,
}

impl Viewer {
    fn from_session(session: &SessionState) -> Self {
        match session.user() {
            Some(user) if user.is_admin() => Viewer::Admin,
            Some(_) => Viewer::Member,
            None => Viewer::Unknown,
        }
    }
}

/// Public flag and group selection for one connector form.
#[derive(Debug, Clone, Default)]
pub struct GroupAccess {
    visibility: Visibility,
    viewer: Viewer,
    groups: Option<Vec<UserGroup>>,
}

impl GroupAccess {
    pub fn new(visibility: Visibility) -> Self {
        Self {
            visibility,
            ..Self::default()
        }
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }

    pub fn selected_group_ids(&self) -> Vec<i64> {
        self.visibility.group_ids()
    }

    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    pub fn is_admin(&self) -> bool {
        self.viewer == Viewer::Admin
    }

    /// Available groups once loaded.
    pub fn groups(&self) -> Option<&[UserGroup]> {
        self.groups.as_deref()
    }

    /// Records the viewer's role. Known non-administrators cannot publish
    /// documents, so the connector is forced back to restricted.
    pub fn apply_session(&mut self, session: &SessionState) {
        self.viewer = Viewer::from_session(session);
        if self.viewer == Viewer::Member && self.is_public() {
            debug!("non-admin viewer; connector forced to restricted visibility");
            self.visibility = Visibility::default();
        }
    }

    pub fn set_groups(&mut self, groups: Vec<UserGroup>) {
        self.groups = Some(groups);
    }

    /// Sets the public flag. Going public clears the selection; known
    /// non-administrators may not go public. Returns whether anything changed.
    pub fn set_public(&mut self, public: bool) -> bool {
        match (public, &self.visibility) {
            (true, Visibility::Public) | (false, Visibility::Restricted(_)) => false,
            (true, Visibility::Restricted(_)) if self.viewer == Viewer::Member => false,
            (true, Visibility::Restricted(_)) => {
                self.visibility = Visibility::Public;
                true
            }
            (false, Visibility::Public) => {
                self.visibility = Visibility::default();
                true
            }
        }
    }

    /// Selects the only available group for a known non-administrator who has
    /// nothing selected yet. Runs as part of every render pass; returns
    /// whether the selection changed.
    pub fn auto_select(&mut self) -> bool {
        if self.viewer != Viewer::Member {
            return false;
        }
        let Some([only]) = self.groups.as_deref() else {
            return false;
        };
        match &mut self.visibility {
            Visibility::Restricted(ids) if ids.is_empty() => {
                debug!(group_id = only.id, "auto-selected the only available group");
                ids.insert(only.id);
                true
            }
            _ => false,
        }
    }

    /// Whether a group should be painted as selected.
    pub fn is_selected(&self, group_id: i64) -> bool {
        let in_set = matches!(&self.visibility, Visibility::Restricted(ids) if ids.contains(&group_id));
        in_set || (!self.is_admin() && self.groups.as_ref().is_some_and(|groups| groups.len() == 1))
    }

    /// Toggles a group's membership in the selection.
    ///
    /// Ignored while public or for ids that are not among the available
    /// groups. A non-administrator cannot remove the last selected group.
    pub fn toggle(&mut self, group_id: i64) -> bool {
        let known = self
            .groups
            .as_ref()
            .is_some_and(|groups| groups.iter().any(|group| group.id == group_id));
        if !known {
            return false;
        }
        let is_admin = self.is_admin();
        let Visibility::Restricted(ids) = &mut self.visibility else {
            return false;
        };
        if ids.contains(&group_id) {
            if !is_admin && ids.len() == 1 {
                debug!(group_id, "refusing to deselect the last group");
                return false;
            }
            ids.shift_remove(&group_id);
        } else {
            ids.insert(group_id);
        }
        true
    }

    /// Whether the group picker is shown at all.
    pub fn section_visible(&self) -> bool {
        let Some(groups) = &self.groups else {
            return false;
        };
        !self.is_admin() || (!self.is_public() && !groups.is_empty())
    }

    /// Only administrators see the "Documents are Public?" toggle.
    pub fn public_toggle_visible(&self) -> bool {
        self.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conform_types::{User, UserRole};

    fn groups(ids: &[i64]) -> Vec<UserGroup> {
        ids.iter().map(|id| UserGroup::new(*id, format!("group-{id}"))).collect()
    }

    fn member() -> SessionState {
        SessionState::SignedIn(User::new("curator@example.com", UserRole::Curator))
    }

    fn admin() -> SessionState {
        SessionState::SignedIn(User::new("admin@example.com", UserRole::Admin))
    }

    #[test]
    fn single_group_member_auto_selects_after_one_pass() {
        let mut access = GroupAccess::default();
        access.apply_session(&member());
        access.set_groups(groups(&[7]));
        assert!(access.auto_select());
        assert_eq!(access.selected_group_ids(), vec![7]);
        assert!(!access.auto_select());
    }

    #[test]
    fn auto_select_waits_for_the_viewer() {
        let mut access = GroupAccess::default();
        access.set_groups(groups(&[7]));
        assert!(!access.auto_select());
        access.apply_session(&SessionState::Anonymous);
        assert!(!access.auto_select());
        access.apply_session(&admin());
        assert!(!access.auto_select());
        assert!(access.selected_group_ids().is_empty());
    }

    #[test]
    fn member_cannot_clear_the_selection() {
        let mut access = GroupAccess::default();
        access.apply_session(&member());
        access.set_groups(groups(&[1, 2]));
        assert!(access.toggle(1));
        assert!(access.toggle(2));
        assert!(access.toggle(1));
        assert!(!access.toggle(2));
        assert_eq!(access.selected_group_ids(), vec![2]);
    }

    #[test]
    fn admin_may_clear_the_selection() {
        let mut access = GroupAccess::default();
        access.apply_session(&admin());
        access.set_groups(groups(&[1]));
        assert!(access.toggle(1));
        assert!(access.toggle(1));
        assert!(access.selected_group_ids().is_empty());
    }

    #[test]
    fn going_public_clears_groups_and_blocks_toggles() {
        let mut access = GroupAccess::default();
        access.apply_session(&admin());
        access.set_groups(groups(&[1, 2]));
        access.toggle(1);
        assert!(access.set_public(true));
        assert!(access.selected_group_ids().is_empty());
        assert!(!access.toggle(2));
        assert!(access.set_public(false));
        assert_eq!(access.visibility(), &Visibility::Restricted(IndexSet::new()));
    }

    #[test]
    fn member_is_forced_restricted() {
        let mut access = GroupAccess::new(Visibility::Public);
        access.apply_session(&member());
        assert!(!access.is_public());
        assert!(!access.set_public(true));
        assert!(!access.public_toggle_visible());
    }

    #[test]
    fn unknown_groups_are_ignored() {
        let mut access = GroupAccess::default();
        access.apply_session(&admin());
        assert!(!access.toggle(1));
        access.set_groups(groups(&[1]));
        assert!(!access.toggle(99));
    }

    #[test]
    fn section_visibility_follows_role_and_public_flag() {
        let mut access = GroupAccess::default();
        access.apply_session(&admin());
        assert!(!access.section_visible());
        access.set_groups(Vec::new());
        assert!(!access.section_visible());
        access.set_groups(groups(&[1]));
        assert!(access.section_visible());
        access.set_public(true);
        assert!(!access.section_visible());

        let mut access = GroupAccess::default();
        access.apply_session(&member());
        access.set_groups(Vec::new());
        assert!(access.section_visible());
    }

    #[test]
    fn single_group_renders_selected_for_non_admins() {
        let mut access = GroupAccess::default();
        access.set_groups(groups(&[3]));
        assert!(access.is_selected(3));
        access.apply_session(&admin());
        assert!(!access.is_selected(3));
    }
}
