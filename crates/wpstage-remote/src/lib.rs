//! wpstage Remote - everything that leaves the machine.
//!
//! - [`Catalog`]: remote version lookups and product registration, over
//!   HTTP ([`CatalogClient`]) or a local directory ([`LocalCatalog`])
//! - [`ObjectStore`]: bucketed blob storage ([`LocalObjectStore`],
//!   [`HttpObjectStore`])
//! - [`Uploader`]: bounded-parallel uploads with per-file retry
//! - [`Publisher`]: a staged release pushed to storage and registered
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wpstage_remote::{LocalCatalog, LocalObjectStore, Publisher, PublishRequest};
//! use wpstage_core::PackageKind;
//!
//! # async fn run() -> wpstage_remote::Result<()> {
//! let publisher = Publisher::new(
//!     Arc::new(LocalObjectStore::new("/srv/buckets")),
//!     Arc::new(LocalCatalog::new("/srv/catalog")),
//! );
//! let receipt = publisher
//!     .publish(&PublishRequest {
//!         kind: PackageKind::Plugin,
//!         slug: "akismet".into(),
//!         version: "5.3".into(),
//!         name: "Akismet".into(),
//!         author: None,
//!         author_url: None,
//!         version_dir: "/srv/staging/plugin/akismet/5.3".into(),
//!     })
//!     .await?;
//! println!("{}", receipt.archive_key);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod content_type;
pub mod error;
pub mod publish;
pub mod retry;
pub mod storage;
pub mod upload;

pub use catalog::{
    catalog_from_settings, Catalog, CatalogClient, CatalogEntry, CatalogVersion, LocalCatalog,
    ProductPayload, ADMIN_SECRET_HEADER,
};
pub use client::HttpClient;
pub use content_type::{content_type_for, is_uploadable, UPLOAD_EXTENSIONS};
pub use error::{Error, Result};
pub use publish::{PublishReceipt, PublishRequest, Publisher};
pub use retry::RetryPolicy;
pub use storage::{store_from_settings, HttpObjectStore, LocalObjectStore, ObjectStore};
pub use upload::{UploadReport, Uploader};
