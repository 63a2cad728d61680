//! Shared type definitions for the Conform admin console.
//!
//! The models here are consumed by the form engine, the HTTP client, and the
//! terminal front end. They describe connector configuration schemas, the
//! values a form holds, and the identity records the console reads from the
//! backend.

pub mod connector;
pub mod starter;
pub mod user;

pub use connector::{ConnectionConfiguration, FieldKind, FieldSchema, FieldValue, FormValues, SelectOption, CONNECTOR_NAME_FIELD};
pub use starter::{STARTER_MESSAGE_COUNT, StarterMessage};
pub use user::{ImpersonateRequest, User, UserGroup, UserRole};
