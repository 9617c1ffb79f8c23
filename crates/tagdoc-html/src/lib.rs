pub mod blank;
pub mod document;
pub mod error;
pub mod escape;
pub mod page;
pub mod postprocess;
pub mod text;
pub mod toc;
pub mod writer;
pub mod xref;

// Re-export the types needed to drive a run
pub use document::{Document, LineFlag, TaggedLine, TocEntry};
pub use error::HtmlError;
pub use postprocess::Registry;
pub use writer::{ClosedRun, HtmlWriter, write_html};
