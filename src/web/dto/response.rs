//! Response DTOs for Web API.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::db::{CodeEntry, CodeKind, Machine, User, WorkSession};

/// Login response.
#[derive(Debug, serde::Serialize)]
pub struct TokenResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Always "bearer".
    pub token_type: String,
    /// External identifier of the logged-in machine.
    pub machine_id: String,
}

impl TokenResponse {
    /// Create a bearer token response.
    pub fn bearer(access_token: String, machine_id: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            machine_id,
        }
    }
}

/// Machine as exposed over the API. The password hash never leaves the
/// server.
#[derive(Debug, serde::Serialize)]
pub struct MachineResponse {
    pub id: i64,
    pub machine_id: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl From<Machine> for MachineResponse {
    fn from(m: Machine) -> Self {
        Self {
            id: m.id,
            machine_id: m.machine_id,
            created_at: m.created_at,
            last_login: m.last_login,
            is_active: m.is_active,
        }
    }
}

/// User response.
#[derive(Debug, serde::Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub role: String,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            role: u.role,
            image_url: u.image_url,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Catalog entry response.
///
/// The code is serialized under the catalog's own field name
/// (`part_number`, `order_number` or `performance_id`).
#[derive(Debug)]
pub struct CodeResponse {
    pub kind: CodeKind,
    pub entry: CodeEntry,
}

impl CodeResponse {
    /// Wrap an entry of the given catalog.
    pub fn new(kind: CodeKind, entry: CodeEntry) -> Self {
        Self { kind, entry }
    }
}

impl Serialize for CodeResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("id", &self.entry.id)?;
        map.serialize_entry(self.kind.key_column(), &self.entry.code)?;
        map.serialize_entry("description", &self.entry.description)?;
        map.serialize_entry("is_active", &self.entry.is_active)?;
        map.serialize_entry("created_at", &self.entry.created_at)?;
        map.end()
    }
}

/// Work session response. `machine_id` is the internal machine ID.
#[derive(Debug, serde::Serialize)]
pub struct WorkSessionResponse {
    pub id: i64,
    pub user_id: i64,
    pub machine_id: i64,
    pub part_number: String,
    pub order_number: String,
    pub performance_id: String,
    pub duration_seconds: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<WorkSession> for WorkSessionResponse {
    fn from(s: WorkSession) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            machine_id: s.machine_id,
            part_number: s.part_number,
            order_number: s.order_number,
            performance_id: s.performance_id,
            duration_seconds: s.duration_seconds,
            start_time: s.start_time,
            end_time: s.end_time,
            created_at: s.created_at,
        }
    }
}

/// Plain confirmation message.
#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    /// Create a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CodeEntry {
        CodeEntry {
            id: 7,
            code: "ORD-2024-001".to_string(),
            description: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_code_response_uses_catalog_field() {
        let json = serde_json::to_value(CodeResponse::new(CodeKind::OrderNumber, entry())).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["order_number"], "ORD-2024-001");
        assert!(json["description"].is_null());
        assert!(json.get("code").is_none());
    }

    #[test]
    fn test_machine_response_omits_hash() {
        let machine = Machine {
            id: 1,
            machine_id: "MACHINE-001".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
        };

        let json = serde_json::to_string(&MachineResponse::from(machine)).unwrap();
        assert!(json.contains("MACHINE-001"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_token_response() {
        let json = serde_json::to_value(TokenResponse::bearer(
            "tok".to_string(),
            "MACHINE-001".to_string(),
        ))
        .unwrap();

        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["machine_id"], "MACHINE-001");
    }
}
