//! Core state for the AI editor.
//!
//! Everything in here is plain data plus pure transformations, with the one
//! exception of [`document`], which reads and writes files. Nothing here
//! touches the terminal or the network.

pub mod command;
pub mod document;
pub mod gutter;
pub mod highlight;
pub mod line_ending;
pub mod messages;
pub mod output;
pub mod selection;
