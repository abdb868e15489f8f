// site -> location groups
use crate::core::plan::Planner;
use crate::core::types::{Group, TechGroup};
use crate::mapping::inventory::{MasterRecord, SiteProfile};

impl<M: MasterRecord + ?Sized> Planner<'_, M> {
    /// One group per location code the site carries for `tech`, in order of
    /// first appearance. Codes shared with the site's NB-IoT cells are left
    /// out. A multi-carrier site can yield several groups.
    pub fn groups_for(&self, profile: &SiteProfile, tech: &TechGroup) -> Vec<Group> {
        profile
            .location_codes_for(tech)
            .iter()
            .map(|code| self.neighbors.group_for(code))
            .collect()
    }
}
