// --- File: crates/careline_common/src/models.rs ---

// Records shared between the database crate and the backend handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
///
/// The password hash never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Fields needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// The public view of a user, as served by the cached profile lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Patient {
    pub id: i64,
    pub name: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewPatient {
    pub name: String,
    pub date_of_birth: NaiveDate,
}

/// Partial update of a patient; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PatientUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date_of_birth.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    /// RFC 3339, always UTC.
    pub date_time: DateTime<Utc>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewAppointment {
    pub patient_id: i64,
    pub date_time: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_serialization_omits_password_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            password_hash: "$2b$12$abc".into(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({ "id": 1, "username": "alice" }));
    }

    #[test]
    fn patient_dates_use_iso_format() {
        let patient: NewPatient =
            serde_json::from_value(json!({ "name": "Bob", "date_of_birth": "1980-02-29" }))
                .unwrap();
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1980, 2, 29).unwrap());

        let bad = serde_json::from_value::<NewPatient>(
            json!({ "name": "Bob", "date_of_birth": "29/02/1980" }),
        );
        assert!(bad.is_err());
    }

    #[test]
    fn appointment_accepts_offsets_and_normalizes_to_utc() {
        let appt: NewAppointment = serde_json::from_value(json!({
            "patient_id": 4,
            "date_time": "2024-01-01T12:00:00+02:00",
            "description": "follow-up"
        }))
        .unwrap();
        assert_eq!(appt.date_time.to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn empty_patient_update() {
        assert!(PatientUpdate::default().is_empty());
        let update: PatientUpdate = serde_json::from_value(json!({ "name": "New" })).unwrap();
        assert!(!update.is_empty());
    }
}
