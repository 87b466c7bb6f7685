pub mod fetcher;
pub mod parser;
pub mod sentiment;

pub use fetcher::{BROWSER_USER_AGENT, ReqwestFetcher};
pub use parser::ScraperParser;
pub use sentiment::LexiconScorer;
