//! Application layer services.
//!
//! Services consume the [`crate::domain::repositories::LinkStore`] trait and
//! give HTTP handlers a small API that speaks in domain outcomes.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation, resolution and listing
//! - [`services::owner_service::OwnerService`] - Signed owner session cookies

pub mod services;
