//! Shared test plumbing: an in-process mock feed speaking the nupack
//! catalog protocol, plus zip fixture builders.

mod fixtures;
mod mock_feed;

pub use fixtures::{package_zip, zip_with_entries};
pub use mock_feed::MockFeed;
