pub mod defs;

pub use defs::{Article, FeedEntry, Preferences, Source, StoreDocument};
