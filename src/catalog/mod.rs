pub mod douban;
pub mod handlers;
pub mod params;
pub mod shortvideo;
pub mod types;
pub mod upstream;

pub use douban::DoubanClient;
pub use handlers::*;
pub use params::{parse_route, CatalogKind, CatalogRoute, ValidationError};
pub use shortvideo::ShortVideoClient;
pub use types::*;
pub use upstream::UpstreamError;
