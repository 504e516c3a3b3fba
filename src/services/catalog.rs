use std::collections::HashMap;

use anyhow::{Result, bail};

use crate::database::models::{Plan, PlanKind, PlanTerm};

/// Fallback validity used by the window repair for plan names the catalog
/// does not know.
pub const UNKNOWN_PLAN_DURATION_DAYS: i64 = 365;

/// Read-only plan table: plan id -> name, term and price.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
    pt_validity_days: i64,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>, pt_validity_days: i64) -> Result<Self> {
        let mut seen = HashMap::new();
        for plan in &plans {
            plan.validate().map_err(anyhow::Error::msg)?;
            if seen.insert(plan.id.as_str(), ()).is_some() {
                bail!("duplicate plan id {}", plan.id);
            }
        }
        Ok(Self {
            plans,
            pt_validity_days,
        })
    }

    /// Build from a JSON array of plans, as found in `PLAN_CATALOG_PATH`.
    pub fn from_json(json: &str, pt_validity_days: i64) -> Result<Self> {
        let plans: Vec<Plan> = serde_json::from_str(json)?;
        Self::new(plans, pt_validity_days)
    }

    pub fn builtin(pt_validity_days: i64) -> Self {
        Self {
            plans: builtin_plans(),
            pt_validity_days,
        }
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    pub fn plans_of(&self, kind: PlanKind) -> impl Iterator<Item = &Plan> {
        self.plans.iter().filter(move |plan| plan.kind == kind)
    }

    pub fn find(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.name == name)
    }

    /// Look up by id first, then by display name.
    pub fn resolve(&self, id: Option<&str>, name: Option<&str>) -> Option<&Plan> {
        id.and_then(|id| self.find(id))
            .or_else(|| name.and_then(|name| self.find_by_name(name)))
    }

    pub fn pt_validity_days(&self) -> i64 {
        self.pt_validity_days
    }

    /// Days between start and end date for a ticket on this plan.
    pub fn validity_days(&self, plan: &Plan) -> i64 {
        match plan.term {
            PlanTerm::Days(days) => days,
            PlanTerm::Sessions(_) => self.pt_validity_days,
        }
    }

    /// Plan name -> nominal validity in days, the lookup table used to
    /// repair tickets stored with `start_date == end_date`.
    pub fn duration_table(&self) -> HashMap<String, i64> {
        self.plans
            .iter()
            .map(|plan| (plan.name.clone(), self.validity_days(plan)))
            .collect()
    }
}

fn builtin_plans() -> Vec<Plan> {
    vec![
        Plan::days("health-3m", "헬스 3개월", PlanKind::Membership, 90, 150_000),
        Plan::days("health-6m", "헬스 6개월", PlanKind::Membership, 180, 270_000),
        Plan::days("health-10m", "헬스 10개월", PlanKind::Membership, 300, 396_000),
        Plan::days("health-12m", "헬스 12개월", PlanKind::Membership, 365, 450_000),
        Plan::sessions("pt-10", "PT 10회", 10, 500_000),
        Plan::sessions("pt-20", "PT 20회", 20, 900_000),
        Plan::sessions("pt-30", "PT 30회", 30, 1_200_000),
        Plan::sessions("pt-50", "PT 50회", 50, 1_800_000),
        Plan::days("locker-1m", "라커 1개월", PlanKind::Locker, 30, 10_000),
        Plan::days("locker-3m", "라커 3개월", PlanKind::Locker, 90, 27_000),
        Plan::days("locker-6m", "라커 6개월", PlanKind::Locker, 180, 50_000),
        Plan::days("locker-12m", "라커 12개월", PlanKind::Locker, 365, 90_000),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = PlanCatalog::builtin(180);
        assert!(PlanCatalog::new(catalog.plans().to_vec(), 180).is_ok());
        assert_eq!(catalog.plans_of(PlanKind::Pt).count(), 4);
        assert_eq!(catalog.find("health-3m").map(|p| p.price), Some(150_000));
    }

    #[test]
    fn test_resolve_falls_back_to_name() {
        let catalog = PlanCatalog::builtin(180);
        let plan = catalog.resolve(Some("retired-plan"), Some("PT 20회")).unwrap();
        assert_eq!(plan.id, "pt-20");
        assert!(catalog.resolve(None, None).is_none());
    }

    #[test]
    fn test_duration_table_maps_pt_to_validity_window() {
        let table = PlanCatalog::builtin(180).duration_table();
        assert_eq!(table.get("헬스 10개월"), Some(&300));
        assert_eq!(table.get("라커 1개월"), Some(&30));
        assert_eq!(table.get("PT 50회"), Some(&180));
    }

    #[test]
    fn test_from_json_rejects_duplicates_and_bad_terms() {
        let duplicate = r#"[
            {"id": "a", "name": "A", "kind": "membership", "term": {"unit": "days", "value": 30}, "price": 1},
            {"id": "a", "name": "B", "kind": "membership", "term": {"unit": "days", "value": 30}, "price": 1}
        ]"#;
        assert!(PlanCatalog::from_json(duplicate, 180).is_err());

        let zero_days = r#"[
            {"id": "a", "name": "A", "kind": "locker", "term": {"unit": "days", "value": 0}, "price": 1}
        ]"#;
        assert!(PlanCatalog::from_json(zero_days, 180).is_err());

        let ok = r#"[
            {"id": "pt-5", "name": "PT 5", "kind": "pt", "term": {"unit": "sessions", "value": 5}, "price": 250000}
        ]"#;
        let catalog = PlanCatalog::from_json(ok, 90).unwrap();
        assert_eq!(catalog.validity_days(catalog.find("pt-5").unwrap()), 90);
    }
}
