//! Application module: the state behind the swipe and playlist screens.
//!
//! `App` lives in `app::model`; the runtime feeds it session snapshots and
//! carries out the `Action`s its key handling returns.

mod model;

pub use model::*;
