//! Service layer.
//!
//! Services hold the request-independent logic and talk to the stores;
//! handlers only translate between HTTP and these calls.

pub mod join;
pub mod profile;
pub mod search;

pub use join::{JoinOutcome, JoinService, RemoteWrite};
pub use profile::{ProfileService, ProfileUpdate, ProfileView};
pub use search::{SearchOutcome, SearchPage, SearchRequest, SearchService};
