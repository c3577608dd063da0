//! Side-loading of related records referenced by a result page

use helpdesk_core::{Record, RecordKind, id_key};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::RecordSource;
use crate::results::{SearchHit, with_url};

/// A related collection that can be attached to a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideLoad {
    Users,
    Organizations,
    Groups,
}

impl SideLoad {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Organizations => "organizations",
            Self::Groups => "groups",
        }
    }

    /// Kind of record this side-load fetches.
    #[must_use]
    pub const fn kind(self) -> RecordKind {
        match self {
            Self::Users => RecordKind::User,
            Self::Organizations => RecordKind::Organization,
            Self::Groups => RecordKind::Group,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "users" => Some(Self::Users),
            "organizations" => Some(Self::Organizations),
            "groups" => Some(Self::Groups),
            _ => None,
        }
    }

    /// Foreign-key fields on a hit that point into this collection.
    const fn reference_fields(self, kind: RecordKind) -> &'static [&'static str] {
        match (self, kind) {
            (Self::Users, RecordKind::Ticket) => &["assignee_id", "requester_id"],
            (Self::Organizations, RecordKind::Ticket | RecordKind::User) => &["organization_id"],
            (Self::Groups, RecordKind::Ticket) => &["group_id"],
            _ => &[],
        }
    }
}

impl std::fmt::Display for SideLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated `include` list. Unknown names are ignored and
/// duplicates collapse.
#[must_use]
pub fn parse_include(include: &str) -> Vec<SideLoad> {
    let mut parsed = Vec::new();
    for name in include.split(',').map(str::trim) {
        if let Some(side_load) = SideLoad::from_name(name)
            && !parsed.contains(&side_load)
        {
            parsed.push(side_load);
        }
    }
    parsed
}

/// Related records attached to a response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideLoaded {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Record>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Record>>,
}

impl SideLoaded {
    #[must_use]
    pub const fn get(&self, side_load: SideLoad) -> Option<&Vec<Record>> {
        match side_load {
            SideLoad::Users => self.users.as_ref(),
            SideLoad::Organizations => self.organizations.as_ref(),
            SideLoad::Groups => self.groups.as_ref(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.users.is_none() && self.organizations.is_none() && self.groups.is_none()
    }

    fn set(&mut self, side_load: SideLoad, records: Vec<Record>) {
        let slot = match side_load {
            SideLoad::Users => &mut self.users,
            SideLoad::Organizations => &mut self.organizations,
            SideLoad::Groups => &mut self.groups,
        };
        *slot = Some(records);
    }
}

/// Fetch the records a page refers to.
///
/// An empty page yields no keys at all. A non-empty page yields every
/// requested key, possibly with an empty list.
pub fn side_load<S>(include: &[SideLoad], page: &[SearchHit], source: &S) -> SideLoaded
where
    S: RecordSource + ?Sized,
{
    let mut loaded = SideLoaded::default();
    if page.is_empty() {
        return loaded;
    }

    for &side_load in include {
        let kind = side_load.kind();
        let records: Vec<Record> = referenced_ids(side_load, page)
            .values()
            .filter_map(|id| source.lookup(kind, id))
            .map(|record| with_url(kind, record))
            .collect();
        tracing::debug!(include = %side_load, count = records.len(), "side-loaded records");
        loaded.set(side_load, records);
    }
    loaded
}

/// Distinct non-empty ids referenced by the page, in first-seen order.
fn referenced_ids(side_load: SideLoad, page: &[SearchHit]) -> IndexMap<String, Value> {
    let mut ids = IndexMap::new();
    for hit in page {
        for field in side_load.reference_fields(hit.kind) {
            let Some(id) = hit.get(field).filter(|v| is_present_id(v)) else {
                continue;
            };
            if let Some(key) = id_key(id) {
                ids.entry(key).or_insert_with(|| id.clone());
            }
        }
    }
    ids
}

/// Zero, empty strings, and `false` never reference a record.
fn is_present_id(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_core::Collections;
    use serde_json::json;

    fn store() -> Collections {
        Collections::from_value(json!({
            "users": [{"id": 1, "name": "Ann"}, {"id": 2, "name": "Bob"}],
            "organizations": [{"id": 10, "name": "Acme"}],
            "groups": {"20": {"id": 20, "name": "Support"}}
        }))
        .unwrap()
    }

    fn ticket(value: Value) -> SearchHit {
        SearchHit::from_record(RecordKind::Ticket, value.as_object().unwrap())
    }

    #[test]
    fn include_parsing() {
        assert_eq!(
            parse_include(" users , groups,users,widgets"),
            vec![SideLoad::Users, SideLoad::Groups]
        );
        assert!(parse_include("").is_empty());
        assert!(parse_include("Users").is_empty());
    }

    #[test]
    fn empty_page_yields_no_keys() {
        let loaded = side_load(&[SideLoad::Users], &[], &store());
        assert!(loaded.is_empty());
        assert_eq!(serde_json::to_value(&loaded).unwrap(), json!({}));
    }

    #[test]
    fn unresolved_ids_yield_empty_list() {
        let page = [ticket(json!({"id": 1, "assignee_id": 999}))];
        let loaded = side_load(&[SideLoad::Users], &page, &store());
        assert_eq!(serde_json::to_value(&loaded).unwrap(), json!({"users": []}));
    }

    #[test]
    fn collects_and_dedupes_references() {
        let page = [
            ticket(json!({"id": 1, "assignee_id": 2, "requester_id": 1, "organization_id": 10, "group_id": 20})),
            ticket(json!({"id": 2, "assignee_id": 2, "requester_id": 0, "group_id": "20"})),
        ];
        let loaded = side_load(
            &[SideLoad::Users, SideLoad::Organizations, SideLoad::Groups],
            &page,
            &store(),
        );
        let users = loaded.get(SideLoad::Users).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["name"], json!("Bob"));
        assert_eq!(users[1]["url"], json!("/api/v2/users/1.json"));
        assert_eq!(loaded.get(SideLoad::Organizations).unwrap().len(), 1);
        assert_eq!(loaded.get(SideLoad::Groups).unwrap().len(), 1);
    }

    #[test]
    fn user_hits_reference_organizations_only() {
        let user = SearchHit::from_record(
            RecordKind::User,
            json!({"id": 2, "organization_id": 10}).as_object().unwrap(),
        );
        let loaded = side_load(&[SideLoad::Users, SideLoad::Organizations], &[user], &store());
        assert_eq!(loaded.users, Some(Vec::new()));
        assert_eq!(loaded.organizations.unwrap()[0]["name"], json!("Acme"));
    }

    #[test]
    fn unrequested_keys_stay_absent() {
        let page = [ticket(json!({"id": 1, "group_id": 20}))];
        let loaded = side_load(&[SideLoad::Groups], &page, &store());
        assert!(loaded.users.is_none());
        assert!(loaded.organizations.is_none());
        assert!(loaded.groups.is_some());
    }
}
