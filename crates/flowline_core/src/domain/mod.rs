//! Engine domain entities as pure value types — no HTTP, no storage.
//!
//! Wire shape is camelCase JSON throughout; dates serialize as RFC3339.

mod case;
mod filter;
mod history;
mod identity;
mod incident;
mod job;
mod process;
mod task;
pub(crate) mod variables;

pub use case::CaseExecution;
pub use filter::{Filter, NewFilter};
pub use history::{HistoricProcessInstance, HistoricProcessInstanceState, HistoricVariableInstance};
pub use identity::{Group, NewUser, User};
pub use incident::Incident;
pub use job::{Job, JobDefinition};
pub use process::{CorrelationResultType, ExecutionRef, MessageCorrelationResult, ProcessInstance};
pub use task::{DelegationState, NewTask, Task, UpdateTask};
pub use variables::{VariableInstance, VariableValue};
