//! The plan model: id grammar, status domains, interdependency links, and
//! the graph itself.

pub mod graph;
pub mod id;
pub mod links;
pub mod status;

pub use graph::PlanGraph;
pub use id::{IdPatterns, NodeId};
pub use links::LinkSpec;
pub use status::{ProgressStatus, ScheduleStatus, StatusDomain};
