//! Domain types for StockLab

pub mod bar;
pub mod quote;
pub mod request;

pub use bar::{PriceBar, PriceSeries};
pub use quote::QuoteSummary;
pub use request::FetchRequest;
