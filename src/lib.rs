//! protocoldude: turns meeting minutes into numbered agenda items and mails everyone mentioned.
//!
//! The library holds the segmentation and recipient-resolution pipeline together with the
//! collaborators the binary wires around it (directory, mail, templating, version control).
#![allow(clippy::multiple_crate_versions)]

pub mod alias;
pub mod config;
pub mod directory;
pub mod document;
pub mod input;
pub mod mention;
pub mod notify;
pub mod pipeline;
pub mod resolver;
pub mod section;
pub mod segmenter;
pub mod template;
pub mod vcs;

#[cfg(test)]
pub(crate) mod testing;
