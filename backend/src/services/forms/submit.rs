//! The submission pipeline: validates an incoming application, assembles
//! the profile record, and persists it.
//!
//! Steps, in order: parse and check the date of birth (minimum age 18),
//! decode the address fields, map the stored uploads to document entries,
//! then insert the whole record atomically. Age is computed by plain
//! calendar-year subtraction; month and day are ignored, so a person whose
//! birthday has not yet occurred this year counts as one year older. That
//! is the long-standing behavior of this form and is kept as-is.

use crate::db;
use crate::error::SubmitError;
use crate::services::forms::intake::{self, StoredFile};
use crate::services::forms::UPLOADS_PREFIX;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::{Datelike, NaiveDate, Utc};
use common::model::address::Address;
use common::model::document::Document;
use common::model::profile::Profile;
use log::error;
use serde_json::json;
use std::collections::HashMap;

/// Minimum accepted age, in calendar years.
const MINIMUM_AGE: i32 = 18;

const AGE_MESSAGE: &str = "Age must be 18 or older";

/// Actix handler for `POST /submit`.
///
/// Reads the multipart payload (files land on disk first), runs the
/// pipeline, and maps the outcome to an HTTP response. When the pipeline
/// rejects the submission, the files stored by this request are discarded
/// again.
pub async fn process(payload: Multipart, state: web::Data<AppState>) -> HttpResponse {
    let submission = match intake::read_submission(payload, &state.uploads_dir).await {
        Ok(submission) => submission,
        Err(e) => return failure_response(e),
    };

    match submit(&submission.fields, &submission.files, &state) {
        Ok(user) => HttpResponse::Ok().json(json!({
            "message": "User submitted successfully",
            "user": user,
        })),
        Err(e) => {
            intake::discard_files(&submission.files, &state.uploads_dir);
            failure_response(e)
        }
    }
}

fn failure_response(e: SubmitError) -> HttpResponse {
    if e.is_client_error() {
        HttpResponse::BadRequest().json(json!({ "message": e.to_string() }))
    } else {
        error!("submission failed: {}", e);
        HttpResponse::InternalServerError().json(json!({
            "message": "Error submitting user data",
            "error": e.to_string(),
        }))
    }
}

/// Validates the submission and persists it, returning the stored profile
/// with its generated identifier.
pub fn submit(
    fields: &HashMap<String, String>,
    files: &[StoredFile],
    state: &AppState,
) -> Result<Profile, SubmitError> {
    let profile = assemble_profile(fields, files, Utc::now().date_naive())?;
    let mut conn = state.db.lock().map_err(|_| SubmitError::LockPoisoned)?;
    Ok(db::insert_profile(&mut conn, profile)?)
}

/// Builds the profile record from the raw fields and stored files. The
/// identifier is left empty; the store assigns it on insert.
pub fn assemble_profile(
    fields: &HashMap<String, String>,
    files: &[StoredFile],
    today: NaiveDate,
) -> Result<Profile, SubmitError> {
    let date_of_birth = parse_date_of_birth(require(fields, "dateOfBirth")?)?;
    if age_in_calendar_years(date_of_birth, today) < MINIMUM_AGE {
        return Err(SubmitError::Validation(AGE_MESSAGE.to_string()));
    }

    let residential_address = parse_address(require(fields, "residentialAddress")?, "residentialAddress")?;
    let is_same_as_residential = parse_flag(require(fields, "isSameAsResidential")?);
    let permanent_address = if is_same_as_residential {
        // Stored as absent, never copied from the residential address.
        None
    } else {
        Some(parse_address(require(fields, "permanentAddress")?, "permanentAddress")?)
    };

    Ok(Profile {
        id: String::new(),
        first_name: require(fields, "firstName")?.to_string(),
        last_name: require(fields, "lastName")?.to_string(),
        email: require(fields, "email")?.to_string(),
        date_of_birth,
        residential_address,
        permanent_address,
        is_same_as_residential,
        documents: files.iter().map(to_document).collect(),
    })
}

fn require<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str, SubmitError> {
    fields
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| SubmitError::MalformedInput(format!("Missing required field `{name}`")))
}

fn parse_date_of_birth(raw: &str) -> Result<NaiveDate, SubmitError> {
    raw.parse().map_err(|_| {
        SubmitError::MalformedInput(format!("dateOfBirth must be an ISO date, got `{raw}`"))
    })
}

/// Age by calendar-year subtraction, month and day ignored.
fn age_in_calendar_years(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    today.year() - date_of_birth.year()
}

/// The flag arrives as the literal string `"true"` or `"false"`; anything
/// other than `"true"` counts as false, matching the form's contract.
fn parse_flag(raw: &str) -> bool {
    raw == "true"
}

fn parse_address(raw: &str, name: &str) -> Result<Address, SubmitError> {
    serde_json::from_str(raw)
        .map_err(|e| SubmitError::MalformedInput(format!("Field `{name}` is not valid JSON: {e}")))
}

fn to_document(file: &StoredFile) -> Document {
    Document {
        file_name: file.original_name.clone(),
        file_type: file.mime_type.clone(),
        file_path: format!("{UPLOADS_PREFIX}/{}", file.stored_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_fields() -> HashMap<String, String> {
        [
            ("firstName", "A"),
            ("lastName", "B"),
            ("email", "a@b.com"),
            ("dateOfBirth", "2000-01-01"),
            ("residentialAddress", r#"{"street1":"X"}"#),
            ("isSameAsResidential", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn accepts_exactly_eighteen_by_calendar_years() {
        let mut fields = base_fields();
        // Birthday later in the year: really 17, counted as 18.
        fields.insert("dateOfBirth".to_string(), "2006-12-31".to_string());

        let profile = assemble_profile(&fields, &[], today()).unwrap();
        assert_eq!(profile.date_of_birth, NaiveDate::from_ymd_opt(2006, 12, 31).unwrap());
    }

    #[test]
    fn rejects_seventeen_with_the_exact_message() {
        let mut fields = base_fields();
        fields.insert("dateOfBirth".to_string(), "2007-01-01".to_string());

        let err = assemble_profile(&fields, &[], today()).unwrap_err();
        match err {
            SubmitError::Validation(msg) => assert_eq!(msg, "Age must be 18 or older"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_under_age_scenario_from_the_form() {
        let mut fields = base_fields();
        fields.insert("dateOfBirth".to_string(), "2010-01-01".to_string());

        let err = assemble_profile(&fields, &[], today()).unwrap_err();
        assert!(matches!(err, SubmitError::Validation(_)));
    }

    #[test]
    fn same_as_residential_stores_no_permanent_address() {
        let profile = assemble_profile(&base_fields(), &[], today()).unwrap();

        assert!(profile.is_same_as_residential);
        assert_eq!(profile.permanent_address, None);
        assert!(profile.documents.is_empty());
        assert_eq!(profile.residential_address.street1.as_deref(), Some("X"));
    }

    #[test]
    fn distinct_permanent_address_is_parsed() {
        let mut fields = base_fields();
        fields.insert("isSameAsResidential".to_string(), "false".to_string());
        fields.insert(
            "permanentAddress".to_string(),
            r#"{"street1":"Y","street2":"Y2"}"#.to_string(),
        );

        let profile = assemble_profile(&fields, &[], today()).unwrap();
        let permanent = profile.permanent_address.unwrap();
        assert_eq!(permanent.street1.as_deref(), Some("Y"));
        assert_eq!(permanent.street2.as_deref(), Some("Y2"));
    }

    #[test]
    fn missing_permanent_address_when_flag_is_false_is_rejected() {
        let mut fields = base_fields();
        fields.insert("isSameAsResidential".to_string(), "false".to_string());

        let err = assemble_profile(&fields, &[], today()).unwrap_err();
        assert!(matches!(err, SubmitError::MalformedInput(_)));
    }

    #[test]
    fn malformed_address_json_is_rejected_as_client_error() {
        let mut fields = base_fields();
        fields.insert("residentialAddress".to_string(), "{not json".to_string());

        let err = assemble_profile(&fields, &[], today()).unwrap_err();
        assert!(err.is_client_error());
        assert!(matches!(err, SubmitError::MalformedInput(_)));
    }

    #[test]
    fn unparsable_date_of_birth_is_rejected_as_client_error() {
        let mut fields = base_fields();
        fields.insert("dateOfBirth".to_string(), "not-a-date".to_string());

        let err = assemble_profile(&fields, &[], today()).unwrap_err();
        assert!(matches!(err, SubmitError::MalformedInput(_)));
    }

    #[test]
    fn stored_files_map_to_documents_in_upload_order() {
        let files = vec![
            StoredFile {
                original_name: "passport.png".to_string(),
                mime_type: "image/png".to_string(),
                stored_name: "100-passport.png".to_string(),
            },
            StoredFile {
                original_name: "visa.pdf".to_string(),
                mime_type: "application/pdf".to_string(),
                stored_name: "101-visa.pdf".to_string(),
            },
        ];

        let profile = assemble_profile(&base_fields(), &files, today()).unwrap();
        assert_eq!(profile.documents.len(), 2);
        assert_eq!(profile.documents[0].file_name, "passport.png");
        assert_eq!(profile.documents[0].file_path, "/uploads/100-passport.png");
        assert_eq!(profile.documents[1].file_type, "application/pdf");
        assert_eq!(profile.documents[1].file_path, "/uploads/101-visa.pdf");
    }
}
