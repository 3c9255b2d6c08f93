//! Command Module
//!
//! The text command layer on top of [`Cache`](crate::cache::Cache). A command
//! line is split on whitespace, dispatched by name and evaluated to a
//! [`Reply`].
//!
//! ```text
//!   "ZADD board 3 alice"
//!           │
//!           ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (handler)
//! │  - Dispatch     │
//! │  - Validate     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │     Cache       │  ──>  Reply  (reply)
//! └─────────────────┘
//! ```

pub mod handler;
pub mod reply;

pub use handler::CommandHandler;
pub use reply::Reply;
