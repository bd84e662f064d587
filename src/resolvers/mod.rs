// Resolution strategies. Which one runs is a deploy-time choice made by the
// caller; both implement the same Resolver port and are driven row-by-row.

pub mod browser;
pub mod remote;

pub use browser::{BrowserConfig, BrowserSession};
pub use remote::RemoteLookup;
