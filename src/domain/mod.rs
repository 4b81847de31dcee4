pub mod board;
pub mod filter;
pub mod market;
pub mod site;

pub use board::{NoticeKind, NoticeRequest, SiteBoard};
pub use filter::RecordFilter;
pub use market::MarketResolver;
pub use site::{SiteRecord, Stage};
