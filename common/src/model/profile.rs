use crate::model::address::Address;
use crate::model::document::Document;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One person's submitted application, as persisted and as returned on the
/// wire. Field names serialize in camelCase to match the form contract.
///
/// `permanent_address` is stored absent when `is_same_as_residential` is
/// true; it is never a copy of the residential address, so readers must not
/// assume it mirrors that data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Store-generated opaque identifier, assigned at insert.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub residential_address: Address,
    pub permanent_address: Option<Address>,
    pub is_same_as_residential: bool,
    /// Uploaded documents in upload order. May be empty.
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_wire_names() {
        let profile = Profile {
            id: "abc".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            email: "a@b.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            residential_address: Address {
                street1: Some("X".to_string()),
                street2: None,
            },
            permanent_address: None,
            is_same_as_residential: true,
            documents: vec![Document {
                file_name: "passport.png".to_string(),
                file_type: "image/png".to_string(),
                file_path: "/uploads/1700000000000-passport.png".to_string(),
            }],
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["firstName"], "A");
        assert_eq!(value["dateOfBirth"], "2000-01-01");
        assert_eq!(value["residentialAddress"]["street1"], "X");
        assert!(value["permanentAddress"].is_null());
        assert_eq!(value["isSameAsResidential"], true);
        assert_eq!(value["documents"][0]["fileName"], "passport.png");
        assert_eq!(value["documents"][0]["fileType"], "image/png");
    }
}
