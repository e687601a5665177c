pub mod blobs;
pub mod convert;
pub mod preview;
pub mod viewer;
