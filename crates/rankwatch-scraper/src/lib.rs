pub mod browser;
pub mod channel;
pub mod error;
pub mod http;
pub mod parse;

pub use browser::{BrowserChannel, BrowserChannelFactory};
pub use channel::{build_search_url, ChannelFactory, SearchChannel};
pub use error::FetchError;
pub use http::{HttpChannel, HttpChannelFactory};
