pub mod error;
pub mod fetcher;
pub mod page;
pub mod result;

pub use error::ScanError;
pub use fetcher::{FetcherOptions, HttpFetcher, PageFetcher};
pub use page::PageSnapshot;
pub use result::FetchedPage;
