//! Client-to-cluster requests.

mod close_session;
mod command;
mod keep_alive;
mod open_session;
mod query;

pub use close_session::{CloseSessionRequest, CloseSessionRequestBuilder};
pub use command::{CommandRequest, CommandRequestBuilder};
pub use keep_alive::{KeepAliveRequest, KeepAliveRequestBuilder};
pub use open_session::{OpenSessionRequest, OpenSessionRequestBuilder};
pub use query::{ConsistencyLevel, QueryRequest, QueryRequestBuilder};
