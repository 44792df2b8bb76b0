//! Pipeline stages for booklet generation.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. register a new importer) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! import ──▶ normalize ──▶ tokenize ──▶ paginate
//! (bytes)    (blocks)      (tokens)     (pages, via external measurement)
//! ```
//!
//! 1. [`import`]    — dispatch on file extension; produce semantic Blocks
//! 2. [`normalize`] — clean and filter Blocks; compute the word count
//! 3. [`tokenize`]  — flatten Blocks into the linear Token stream
//! 4. [`paginate`]  — pack Tokens into 16-cell Pages, asking the injected
//!    measurement capability about overflow after every placement
//!
//! [`markup`] is the shared vocabulary between tokenize and paginate: the
//! inline-markup rendering of a single Token, spacer, or header.
//!
//! Stages 1–3 are pure and synchronous. Stage 4 is sequential within one
//! document (placement order is load-bearing) but independent documents may
//! run concurrently.

pub mod import;
pub mod markup;
pub mod normalize;
pub mod paginate;
pub mod tokenize;
