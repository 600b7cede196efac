pub mod builder;
pub use builder::*;

pub mod canon;
pub use canon::*;

pub mod comparator;
pub use comparator::*;

pub mod config;
pub use config::*;

pub mod disk;
pub use disk::*;

pub mod error;
pub use error::*;

pub mod map;
pub use map::*;

pub mod oracle;
pub use oracle::*;

pub mod progress;
pub use progress::*;

pub mod striped;
pub use striped::*;

pub mod summary;
pub use summary::*;

pub mod table;
pub use table::*;
