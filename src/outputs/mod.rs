//! Report generation for a finished run.
//!
//! # Submodules
//!
//! - [`report`]: Renders an [`AgentResponse`](crate::models::AgentResponse) as a console report
//! - [`json`]: Writes the response as a dated JSON file
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── 2025-05-06_morning.json
//! ├── 2025-05-06_afternoon.json
//! └── 2025-05-06_evening.json
//! ```

pub mod json;
pub mod report;
