//! Logic Module - Live classification pipeline
//!
//! ## Structure
//! - `record/` - Classification record model and payload normalization
//! - `store/` - Bounded live result store with aggregate stats
//! - `view/` - Filter/search/sort projection and CSV export
//! - `channel/` - Event channel seam (subscribe, connected flag)
//! - `monitor` - Presentation API tying channel, store and view together
//! - `replay` - JSONL event replay into a local channel

pub mod record;
pub mod store;
pub mod view;
pub mod channel;
pub mod monitor;
pub mod replay;
