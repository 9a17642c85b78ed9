//! Request DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::Validate;

use super::validation::{code_value, no_control_chars, not_empty_trimmed};
use crate::db::{CodeUpdate, NewCode, NewUser, NewWorkSession, UserUpdate};

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Machine login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// External machine identifier.
    pub machine_id: String,
    /// Password.
    pub password: String,
}

/// Machine provisioning request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMachineRequest {
    #[validate(
        length(min = 1, max = 64, message = "Machine ID must be between 1 and 64 characters"),
        custom(function = "no_control_chars")
    )]
    pub machine_id: String,
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 bytes"))]
    pub password: String,
}

/// Machine password reset request.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, max = 128, message = "Password must be between 1 and 128 bytes"))]
    pub new_password: String,
}

/// User creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: String,
    #[validate(
        length(max = 100, message = "Role must be at most 100 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub role: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(req: CreateUserRequest) -> Self {
        NewUser {
            name: req.name.trim().to_string(),
            role: req.role.trim().to_string(),
            image_url: req.image_url,
        }
    }
}

/// Sparse user update. Absent fields stay untouched; `"image_url": null`
/// clears the image.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[serde(default)]
    #[validate(
        length(max = 100, message = "Name must be at most 100 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(
        length(max = 100, message = "Role must be at most 100 characters"),
        custom(function = "not_empty_trimmed")
    )]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<Option<String>>,
}

impl From<UpdateUserRequest> for UserUpdate {
    fn from(req: UpdateUserRequest) -> Self {
        UserUpdate {
            name: req.name.map(|n| n.trim().to_string()),
            role: req.role.map(|r| r.trim().to_string()),
            image_url: req.image_url,
        }
    }
}

/// Defines the creation request of one reference catalog. The wire name of
/// the code field differs per catalog.
macro_rules! code_request {
    ($(#[$doc:meta])* $name:ident, $field:ident) => {
        $(#[$doc])*
        #[derive(Debug, Deserialize, Validate)]
        pub struct $name {
            #[validate(
                length(max = 50, message = "Code must be at most 50 characters"),
                custom(function = "code_value")
            )]
            pub $field: String,
            #[serde(default)]
            #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
            pub description: Option<String>,
        }

        impl From<$name> for NewCode {
            fn from(req: $name) -> Self {
                NewCode {
                    code: req.$field.trim().to_string(),
                    description: req.description,
                }
            }
        }
    };
}

code_request!(
    /// Part number creation request.
    CreatePartNumberRequest,
    part_number
);
code_request!(
    /// Order number creation request.
    CreateOrderNumberRequest,
    order_number
);
code_request!(
    /// Performance ID creation request.
    CreatePerformanceIdRequest,
    performance_id
);

/// Sparse update of a catalog entry, keyed by the generic `code` field.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCodeRequest {
    #[serde(default)]
    #[validate(
        length(max = 50, message = "Code must be at most 50 characters"),
        custom(function = "code_value")
    )]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl From<UpdateCodeRequest> for CodeUpdate {
    fn from(req: UpdateCodeRequest) -> Self {
        CodeUpdate {
            code: req.code.map(|c| c.trim().to_string()),
            description: req.description,
        }
    }
}

/// Work session report.
///
/// Any `machine_id` in the body is ignored; the recording machine is the
/// authenticated one.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkSessionRequest {
    pub user_id: i64,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub part_number: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub order_number: String,
    #[validate(custom(function = "not_empty_trimmed"))]
    pub performance_id: String,
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_seconds: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl CreateWorkSessionRequest {
    /// Check that the session does not end before it starts.
    pub fn check_time_order(&self) -> Result<(), validator::ValidationError> {
        if self.end_time < self.start_time {
            return Err(validator::ValidationError::new("time_order")
                .with_message("End time must not be before start time".into()));
        }
        Ok(())
    }
}

impl From<CreateWorkSessionRequest> for NewWorkSession {
    fn from(req: CreateWorkSessionRequest) -> Self {
        NewWorkSession {
            user_id: req.user_id,
            part_number: req.part_number,
            order_number: req.order_number,
            performance_id: req.performance_id,
            duration_seconds: req.duration_seconds,
            start_time: req.start_time,
            end_time: req.end_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_user_distinguishes_null_from_absent() {
        let absent: UpdateUserRequest = serde_json::from_str(r#"{"name":"Sarah"}"#).unwrap();
        assert_eq!(absent.image_url, None);

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        assert_eq!(cleared.image_url, Some(None));

        let set: UpdateUserRequest = serde_json::from_str(r#"{"image_url":"x.png"}"#).unwrap();
        assert_eq!(set.image_url, Some(Some("x.png".to_string())));
    }

    #[test]
    fn test_update_user_image_url_length() {
        let long = format!(r#"{{"image_url":"{}"}}"#, "a".repeat(501));
        let req: UpdateUserRequest = serde_json::from_str(&long).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("image_url"));

        let cleared: UpdateUserRequest = serde_json::from_str(r#"{"image_url":null}"#).unwrap();
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn test_update_code_rejects_control_characters() {
        let req: UpdateCodeRequest = serde_json::from_str(r#"{"code":"PN\u0000"}"#).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("code"));
    }

    #[test]
    fn test_create_user_validation() {
        let ok: CreateUserRequest =
            serde_json::from_str(r#"{"name":"John","role":"Operator"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let blank: CreateUserRequest =
            serde_json::from_str(r#"{"name":"   ","role":"Operator"}"#).unwrap();
        let errors = blank.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
    }

    #[test]
    fn test_code_request_uses_catalog_field_name() {
        let req: CreatePartNumberRequest =
            serde_json::from_str(r#"{"part_number":" PN-1 ","description":"Bolt"}"#).unwrap();
        assert!(req.validate().is_ok());

        let new_code = NewCode::from(req);
        assert_eq!(new_code.code, "PN-1");
        assert_eq!(new_code.description.as_deref(), Some("Bolt"));

        assert!(serde_json::from_str::<CreateOrderNumberRequest>(r#"{"code":"X"}"#).is_err());
    }

    #[test]
    fn test_work_session_ignores_machine_id() {
        let req: CreateWorkSessionRequest = serde_json::from_str(
            r#"{
                "user_id": 1,
                "machine_id": 42,
                "part_number": "PN-1",
                "order_number": "ORD-1",
                "performance_id": "PERF-1",
                "duration_seconds": 60,
                "start_time": "2024-03-01T06:00:00Z",
                "end_time": "2024-03-01T06:01:00Z"
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_ok());
        assert!(req.check_time_order().is_ok());
    }

    #[test]
    fn test_work_session_rejects_negative_duration_and_reversed_times() {
        let req: CreateWorkSessionRequest = serde_json::from_str(
            r#"{
                "user_id": 1,
                "part_number": "PN-1",
                "order_number": "ORD-1",
                "performance_id": "PERF-1",
                "duration_seconds": -5,
                "start_time": "2024-03-01T07:00:00Z",
                "end_time": "2024-03-01T06:00:00Z"
            }"#,
        )
        .unwrap();

        assert!(req.validate().is_err());
        assert!(req.check_time_order().is_err());
    }
}
