//! # Paddock Client
//!
//! Optimistic mutations against the Paddock entity service.
//!
//! [`OptimisticClient`] keeps a [`QueryCache`](paddock_engine::QueryCache)
//! of entity collections. Creates, updates, and deletes show up in the cache
//! immediately and are reconciled or rolled back once the [`Remote`]
//! answers.
//!
//! ```rust,no_run
//! use paddock_client::{HttpRemote, OptimisticClient};
//! use serde_json::json;
//!
//! # async fn run() -> paddock_client::Result<()> {
//! let mut client = OptimisticClient::new(HttpRemote::from_env()?);
//! client.refresh("batch").await?;
//!
//! let draft = json!({"species": "Catfish", "quantity": 500});
//! let record = client
//!     .create("batch", draft.as_object().cloned().unwrap_or_default())
//!     .await?;
//! println!("created {}", record.id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod remote;

pub use client::OptimisticClient;
pub use error::{ClientError, Result};
pub use remote::{HttpRemote, Remote};
