//! BDE work tracker.
//!
//! Backend for shop-floor data capture ("Betriebsdatenerfassung"): machines
//! log in with their own credentials and record operators' work sessions
//! against part numbers, order numbers and performance IDs.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod web;

pub use auth::{
    authenticate, login_machine, register_machine, reset_machine_password, verify_password,
    LoginOutcome, PasswordError, PasswordHasher, TokenService,
};
pub use config::Config;
pub use db::{
    CodeEntry, CodeKind, CodeRepository, Database, Machine, MachineRepository, NewUser, User,
    UserRepository, WorkSession, WorkSessionRepository,
};
pub use error::{BdeError, Result};
pub use web::WebServer;
