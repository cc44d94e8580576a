//! Line protocol and code tables for puzzle room boards.
//!
//! Boards talk to the controller over serial links using newline-terminated
//! ASCII codes. This crate turns raw bytes into messages ([`LineFramer`]) and
//! messages into actions ([`CodeTable`]). It performs no I/O itself.

pub mod framer;
pub mod table;

pub use framer::LineFramer;
pub use table::CodeTable;
