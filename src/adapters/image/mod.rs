//! Image adapters: Replicate predictions and HTTP download.

pub mod download;
pub mod replicate;

pub use download::HttpImageDownloader;
pub use replicate::ReplicateAdapter;
