//! Field checks applied before any work item write reaches Azure DevOps.

pub const WORK_ITEM_TYPES: &[&str] = &["Task", "Bug", "User Story", "Feature", "Epic"];
pub const WORK_ITEM_STATES: &[&str] = &["New", "Active", "Resolved", "Closed"];

pub fn is_valid_type(work_item_type: &str) -> bool {
    WORK_ITEM_TYPES.contains(&work_item_type)
}

/// Priority runs from 1 (highest) to 4
pub fn is_valid_priority(priority: i64) -> bool {
    (1..=4).contains(&priority)
}

pub fn is_valid_state(state: &str) -> bool {
    WORK_ITEM_STATES.contains(&state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_types() {
        assert!(is_valid_type("User Story"));
        assert!(is_valid_type("Bug"));
        assert!(!is_valid_type("bug"));
        assert!(!is_valid_type("Issue"));
    }

    #[test]
    fn test_priority_bounds() {
        assert!(is_valid_priority(1));
        assert!(is_valid_priority(4));
        assert!(!is_valid_priority(0));
        assert!(!is_valid_priority(5));
    }

    #[test]
    fn test_states() {
        assert!(is_valid_state("Resolved"));
        assert!(!is_valid_state("Done"));
    }
}
