//! Accessor for the CapMIT1003 dataset: captions and click paths
//! recorded over the MIT1003 eye-tracking image set, distributed as a
//! single SQLite database plus a downloadable stimuli archive.
//!
//! ```no_run
//! use capmit1003::{fetch, Dataset};
//! use std::path::Path;
//!
//! # fn main() -> capmit1003::Result<()> {
//! fetch::ensure_images_default()?;
//! let db = Dataset::open("capmit1003.db")?;
//! for caption in db.get_captions()? {
//!     let clicks = db.get_click_path(&caption.obs_uid)?;
//!     let image = Dataset::resolve_image(&caption, Path::new("mit1003/ALLSTIMULI"));
//!     println!("{}: {} clicks, image {:?}", caption.obs_uid, clicks.len(), image);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod fetch;
pub mod logging;

pub use config::Config;
pub use db::{CaptionRecord, ClickRecord, Dataset};
pub use error::{Error, Result};
