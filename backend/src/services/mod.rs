//! HTTP API of the portal.
//!
//! - `/api/session`: login and logout.
//! - `/api/me`: pages of the signed-in student.
//! - `/api/admin/{students,colleges,courses,companies,templates}`: admin pages.
//! - `/v1/students/{id}/eligibility`: the eligibility endpoint.
//! - `/blobs/{token}`: temporary object URLs.

pub mod colleges;
pub mod companies;
pub mod courses;
pub mod crud;
pub mod me;
pub mod search;
pub mod session;
pub mod students;
pub mod templates;
pub mod v1;
pub mod validation;

use crate::certificates::blobs;
use actix_web::web::{self, scope};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        scope("/api")
            .service(session::configure_routes())
            .service(me::configure_routes())
            .service(
                scope("/admin")
                    .service(students::configure_routes())
                    .service(colleges::configure_routes())
                    .service(courses::configure_routes())
                    .service(companies::configure_routes())
                    .service(templates::configure_routes()),
            ),
    )
    .service(v1::configure_routes())
    .service(blobs::configure_routes());
}
