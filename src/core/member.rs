use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of someone sharing costs in a group: a flatmate, a travel
/// companion, a colleague at a shared dinner.
///
/// Ids are compared byte for byte, so `"Ana"` and `"ana"` are two different
/// members. The `Ord` impl only serves sorted containers such as the
/// expense map of a ledger file; matrix rows follow the order in which
/// members joined the ledger.
///
/// Serialized as a bare JSON string:
///
/// ```
/// use expense_settlement::core::member::MemberId;
///
/// let flatmates: Vec<MemberId> = serde_json::from_str(r#"["ana", "ben"]"#).unwrap();
/// assert_eq!(flatmates[1].as_str(), "ben");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    #[test]
    fn test_names_are_case_sensitive() {
        assert_ne!(MemberId::new("Ana"), MemberId::new("ana"));
        assert_eq!(MemberId::from("ana"), MemberId::new(String::from("ana")));
    }

    #[test]
    fn test_display_is_the_bare_name() {
        let ben = MemberId::new("ben");
        assert_eq!(format!("{ben} pays"), "ben pays");
    }

    #[test]
    fn test_expense_map_keys() {
        let expenses: BTreeMap<MemberId, Decimal> =
            serde_json::from_str(r#"{ "cleo": "12.50", "ana": "3" }"#).unwrap();
        let names: Vec<&str> = expenses.keys().map(MemberId::as_str).collect();
        assert_eq!(names, vec!["ana", "cleo"]);
        assert_eq!(expenses[&MemberId::new("cleo")], dec!(12.50));
    }
}
