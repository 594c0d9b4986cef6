use crate::db;
use crate::error::SubmitError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use common::model::profile::Profile;
use log::error;
use serde_json::json;

/// Actix handler for `GET /getFormData`: every persisted profile,
/// unfiltered and unpaginated.
pub async fn process(state: web::Data<AppState>) -> HttpResponse {
    match list_profiles(&state) {
        Ok(data) => HttpResponse::Ok().json(json!({
            "message": "Successfully fetched",
            "data": data,
        })),
        Err(e) => {
            error!("listing profiles failed: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "message": "Error fetching form data",
                "error": e.to_string(),
            }))
        }
    }
}

fn list_profiles(state: &AppState) -> Result<Vec<Profile>, SubmitError> {
    let conn = state.db.lock().map_err(|_| SubmitError::LockPoisoned)?;
    Ok(db::list_profiles(&conn)?)
}
