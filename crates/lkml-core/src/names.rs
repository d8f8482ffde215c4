//! Strongly-typed identifiers shared across the linter.

use crate::identifier::identifier;

identifier! {
    /// Stable identifier of a rule (e.g. `description`, `no_orphans`).
    ///
    /// Used as the key for enable/disable and severity configuration.
    pub struct RuleId;
}

identifier! {
    /// Name of a top-level entity (view or explore), without the `+`
    /// refinement marker.
    pub struct EntityName;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_id_rejects_empty() {
        assert!(RuleId::try_new("").is_none());
        assert!(RuleId::try_from("").is_err());
    }

    #[test]
    fn rule_id_compares_with_str() {
        let id = RuleId::new("description");
        assert_eq!(id, "description");
        assert_eq!(id.to_string(), "description");
    }

    #[test]
    fn entity_name_borrow_lookup() {
        use std::collections::BTreeMap;
        let mut map: BTreeMap<EntityName, u32> = BTreeMap::new();
        map.insert(EntityName::new("orders"), 1);
        assert_eq!(map.get("orders"), Some(&1));
    }

    #[test]
    fn rule_id_serde_rejects_empty() {
        let ok: RuleId = serde_json::from_str(r#""all_caps""#).unwrap();
        assert_eq!(ok, "all_caps");
        assert!(serde_json::from_str::<RuleId>(r#""""#).is_err());
    }
}
