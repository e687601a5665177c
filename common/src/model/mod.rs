pub mod college;
pub mod company;
pub mod course;
pub mod session;
pub mod student;
pub mod template;
pub mod toast;

use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` from the store the same as a missing column.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
