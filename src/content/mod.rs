//! Content module - loads typed records from MDX sources

pub mod error;
mod frontmatter;
pub mod loader;
pub mod mdx;
mod record;

pub use error::{DocumentError, DocumentErrorKind, LoadError};
pub use frontmatter::{FrontMatter, FrontMatterError, RawFields};
pub use loader::{load_all, ContentLoader, LoadReport};
pub use mdx::{CompiledBody, MdxCompiler, Node, Props};
pub use record::{ContentCollection, ContentRecord};
