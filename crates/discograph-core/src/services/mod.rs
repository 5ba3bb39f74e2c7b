pub mod crawler;
pub mod session;

pub use crawler::{CancelFlag, CrawlReport, Crawler, NO_LABEL};
pub use session::{SessionService, SessionSettings};
