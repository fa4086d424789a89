//! apisim - Simulated REST API with request interception
//!
//! An in-process interceptor that diverts outbound calls matching a fixed
//! base prefix to an in-memory user API, returning responses shaped like real
//! HTTP responses. Non-matching calls pass through to the real transport.

pub mod cli;
pub mod error;
pub mod intercept;
pub mod request;
pub mod response;
pub mod router;
pub mod settings;
pub mod store;
pub mod telemetry;

pub use error::ApiError;
pub use intercept::{HttpTransport, MockInterceptor, OfflineTransport};
pub use request::{RequestDescriptor, RequestOptions};
pub use response::Response;
pub use router::Router;
pub use settings::Settings;
pub use store::UserStore;
