//! revu-core: the review session model shared by the `revu` terminal dashboard.
//!
//! Everything in this crate is free of terminal I/O: the data model (`types`),
//! ANSI-aware text measurement (`text`), the comment metadata parser (`parser`),
//! the session state and its merge rules (`state`), the navigation reducer
//! (`nav`), the collaborator traits (`service`), and the interval scheduler
//! (`scheduler`). The binary crate owns the terminal and feeds events in.

pub mod error;
pub mod nav;
pub mod parser;
pub mod scheduler;
pub mod service;
pub mod state;
pub mod text;
pub mod types;
