//! Source fetchers for the tf resolution pipeline
//!
//! Each backend (local files, etcd, HTTP endpoints, MySQL) turns an input
//! definition into a generic [`types::Value`]. [`FetcherSet`] dispatches on the
//! input type and is what the resolver drives through the [`Fetcher`] trait.

pub mod file;
pub mod http;
pub mod kv;
pub mod registry;
pub mod sql;
pub mod traits;

pub use file::FileFetcher;
pub use http::HttpFetcher;
pub use kv::EtcdFetcher;
pub use registry::FetcherSet;
pub use sql::MysqlFetcher;
pub use traits::Fetcher;
