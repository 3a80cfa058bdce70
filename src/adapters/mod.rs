//! Outbound HTTP adapters.

mod fragment_api;
mod release_api;

pub use fragment_api::{FragmentApiClient, FragmentSource};
pub use release_api::{check_for_update, ReleaseApiClient};

#[cfg(test)]
pub(crate) use fragment_api::MockFragmentSource;
