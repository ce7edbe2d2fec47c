//! Data retrieval and normalization

pub mod marketstack;
pub mod normalize;
pub mod provider;
pub mod transport;

pub use marketstack::{MarketstackProvider, ProviderSettings};
pub use normalize::normalize;
pub use provider::{
    DataError, DataProvider, DownloadProgress, FetchResult, RawRecord, StderrProgress,
};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
