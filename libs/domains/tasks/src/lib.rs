//! Tasks Domain
//!
//! Client-side task state for the signed-in user: an in-memory collection kept in
//! step with the remote task API, and a filtered view of it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │ FilterProjector  │  ← query / status / priority view, recomputed on change
//! └────────┬─────────┘
//!          │ watch
//! ┌────────▼─────────┐
//! │    TaskStore     │  ← collection, loading flag, error slot
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │    TaskRemote    │  ← remote source of truth (trait + HTTP implementation)
//! └────────┬─────────┘
//!          │
//! ┌────────▼─────────┐
//! │      Models      │  ← Task, DTOs, enums
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use core_config::ApiConfig;
//! use domain_tasks::{FilterProjector, HttpTaskRemote, StatusFilter, TaskStore};
//! use domain_users::SessionHandle;
//!
//! # async fn example(session: SessionHandle) -> Result<(), Box<dyn std::error::Error>> {
//! let remote = HttpTaskRemote::new(ApiConfig::default(), session)?;
//! let store = TaskStore::new(remote);
//! let mut projector = FilterProjector::new(store.subscribe());
//!
//! store.load().await;
//! projector.refresh();
//! projector.set_status(StatusFilter::Active);
//!
//! for task in projector.visible() {
//!     println!("{}", task.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod filter;
pub mod http;
pub mod models;
pub mod remote;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use error::{StoreError, TaskError, TaskResult};
pub use filter::{FilterCriteria, FilterProjector, FilterSummary, PriorityFilter, StatusFilter, project};
pub use http::HttpTaskRemote;
pub use models::{CreateTask, Task, TaskId, TaskPriority, UpdateTask, parse_due_date};
pub use remote::TaskRemote;
pub use stats::TaskStats;
pub use store::TaskStore;
