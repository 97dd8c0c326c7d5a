//! Library data model and folder scanning.
//!
//! `model` holds the persisted `Track`/`Playlist`/`User` records; `scan`
//! reconciles a playlist folder's current contents against the known track
//! list without losing user-applied order.

mod model;
mod scan;

pub use model::*;
pub use scan::*;
