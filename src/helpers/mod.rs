//! Helper collaborators shared by the loader, resolver and generator
//!
//! Date formatting, reading time estimation, URL building and HTML
//! snippets. All of them are pure functions of their input.

mod date;
mod html;
mod reading_time;
mod url;

pub use date::*;
pub use html::*;
pub use reading_time::*;
pub use url::*;
