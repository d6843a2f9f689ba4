//! Browser discovery, launch and scoped ownership

pub mod page_helpers;
pub mod setup;
pub mod wrapper;

pub use setup::{LaunchOptions, download_managed_browser, find_browser_executable, launch_browser};
pub use wrapper::BrowserWrapper;
