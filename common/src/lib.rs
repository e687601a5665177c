//! Types shared between the portal shell and its clients: store rows,
//! request payloads, toasts and session roles.

pub mod model;
pub mod requests;
