//! Article content: assembly, slugs, and emission.
//!
//! ```text
//! KeywordRecord + BlockSet ──Assembler──▶ AssembledContent
//!                                              │
//!                                          Emitter
//!                                              ▼
//!                              {output_dir}/{slug}.md
//! ```

pub mod assembler;
pub mod emitter;
pub mod slug;

pub use assembler::{AssembledContent, Assembler, AssemblyOptions, SectionTopic};
pub use emitter::{EmitError, Emitter, PublishOffset};
pub use slug::slugify;
