use std::collections::BTreeSet;

use super::config::ExpertTitles;
use super::CategoryGroup;

/// One line per distinct category whose regular check carries a reviewer name.
pub(crate) fn expert_lines(groups: &[CategoryGroup<'_>], titles: &ExpertTitles) -> Vec<String> {
    let mut seen = BTreeSet::new();
    groups
        .iter()
        .filter(|group| seen.insert(group.category.id))
        .filter_map(|group| {
            let reviewer = group.criteria.regular_checked_by()?;
            let name = reviewer.display_name.trim();
            if name.is_empty() {
                return None;
            }
            Some(format!("{} - {}", titles.resolve(group.category), name))
        })
        .collect()
}
