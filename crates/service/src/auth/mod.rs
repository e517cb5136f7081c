//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Login, super-admin bootstrap, password hashing and JWT issue/verify live
//! here so the HTTP layer only translates requests and errors.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::{AuthConfig, AuthService};
pub use token::{Claims, JwtKeys};
