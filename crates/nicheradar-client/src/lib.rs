pub mod catalog;
pub mod detail;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod normalize;
pub mod types;

pub use catalog::CatalogFetcher;
pub use detail::DetailLookup;
pub use error::{BuildError, FetchError, InputError};
pub use gateway::{BackendGateway, HttpGateway};
pub use lifecycle::{LifecycleState, Phase, RequestLifecycle, RequestToken, Settled, StateReceiver};
pub use normalize::{normalize_product, parse_catalog, parse_detail};
