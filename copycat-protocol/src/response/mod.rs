//! Cluster-to-client responses.
//!
//! Every response starts with a status byte. Body fields follow only when the
//! status is ok; failed responses carry an error kind instead.

mod close_session;
mod command;
mod keep_alive;
mod open_session;
mod operation;
mod query;

pub use close_session::{CloseSessionResponse, CloseSessionResponseBuilder};
pub use command::{CommandResponse, CommandResponseBuilder};
pub use keep_alive::{KeepAliveResponse, KeepAliveResponseBuilder};
pub use open_session::{OpenSessionResponse, OpenSessionResponseBuilder};
pub use operation::OperationResult;
pub use query::{QueryResponse, QueryResponseBuilder};
