//! Configuration module

mod site;

pub use site::DocumentTypeConfig;
pub use site::ExternalLinkConfig;
pub use site::HighlightConfig;
pub use site::SiteConfig;
pub use site::CONFIG_FILES;
