//! Toy single-node cluster hosting `counter` state machines.
//!
//! Run with: cargo run --bin counter-server
//! Then: cargo run --bin counter-client

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use copycat_protocol::prelude::*;
use copycat_protocol_examples::{FramedStream, encode_counter, server_addr};
use tokio::net::{TcpListener, TcpStream};

const STATE_MACHINE_TYPE: &str = "counter";

struct Session {
    name: String,
    value: i64,
}

#[derive(Default)]
struct Cluster {
    next_session: i64,
    log_index: i64,
    sessions: HashMap<i64, Session>,
}

impl Cluster {
    fn handle(&mut self, request: AnyRequest, leader: &str) -> Result<AnyResponse, BuildError> {
        let response = match request {
            AnyRequest::OpenSession(req) => self.open_session(&req)?.into(),
            AnyRequest::KeepAlive(req) => self.keep_alive(&req, leader)?.into(),
            AnyRequest::Command(req) => self.command(&req)?.into(),
            AnyRequest::Query(req) => self.query(&req)?.into(),
            AnyRequest::CloseSession(req) => self.close_session(&req)?.into(),
        };
        Ok(response)
    }

    fn open_session(
        &mut self,
        req: &OpenSessionRequest,
    ) -> Result<OpenSessionResponse, BuildError> {
        if req.type_name() != STATE_MACHINE_TYPE {
            return OpenSessionResponse::builder()
                .with_error(ErrorKind::UnknownStateMachine)
                .build();
        }

        self.next_session += 1;
        self.sessions.insert(
            self.next_session,
            Session {
                name: req.name().to_owned(),
                value: 0,
            },
        );
        tracing::info!(session = self.next_session, name = req.name(), "opened session");

        OpenSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_session(self.next_session)?
            .with_timeout(req.timeout())?
            .build()
    }

    fn keep_alive(&self, req: &KeepAliveRequest, leader: &str) -> Result<KeepAliveResponse, BuildError> {
        let builder = KeepAliveResponse::builder();
        let builder = if self.sessions.contains_key(&req.session()) {
            builder.with_status(ResponseStatus::Ok).with_leader(leader)
        } else {
            builder.with_error(ErrorKind::UnknownSession)
        };
        builder.build()
    }

    fn command(&mut self, req: &CommandRequest) -> Result<CommandResponse, BuildError> {
        let builder = CommandResponse::builder();
        let Some(session) = self.sessions.get_mut(&req.session()) else {
            return builder.with_error(ErrorKind::UnknownSession).build();
        };
        if req.operation().as_ref() != b"incr" {
            return builder.with_error(ErrorKind::Application).build();
        }

        self.log_index += 1;
        session.value += 1;
        builder
            .with_status(ResponseStatus::Ok)
            .with_index(self.log_index)?
            .with_result(encode_counter(session.value))
            .build()
    }

    fn query(&self, req: &QueryRequest) -> Result<QueryResponse, BuildError> {
        let builder = QueryResponse::builder();
        let Some(session) = self.sessions.get(&req.session()) else {
            return builder.with_error(ErrorKind::UnknownSession).build();
        };
        builder
            .with_status(ResponseStatus::Ok)
            .with_index(self.log_index)?
            .with_result(encode_counter(session.value))
            .build()
    }

    fn close_session(
        &mut self,
        req: &CloseSessionRequest,
    ) -> Result<CloseSessionResponse, BuildError> {
        let builder = CloseSessionResponse::builder();
        let builder = match self.sessions.remove(&req.session()) {
            Some(session) => {
                tracing::info!(session = req.session(), name = %session.name, "closed session");
                builder.with_status(ResponseStatus::Ok)
            }
            None => builder.with_error(ErrorKind::UnknownSession),
        };
        builder.build()
    }
}

async fn serve(
    stream: TcpStream,
    cluster: Arc<Mutex<Cluster>>,
    leader: String,
) -> anyhow::Result<()> {
    let mut framed = FramedStream::new(stream, Serializer::new());
    // an undecodable frame ends the connection
    while let Some(request) = framed.read_request().await? {
        tracing::debug!(%request, "received");

        let response = {
            let mut cluster = cluster
                .lock()
                .map_err(|_| anyhow::anyhow!("cluster state poisoned"))?;
            cluster.handle(request, &leader)?
        };
        tracing::debug!(%response, "responding");
        let bytes = response.to_frame(framed.serializer())?;
        framed.write_frame(bytes).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let addr = server_addr()?;
    let listener = TcpListener::bind(addr).await?;
    let cluster = Arc::new(Mutex::new(Cluster::default()));
    tracing::info!(%addr, "counter cluster listening");

    loop {
        let (stream, peer) = listener.accept().await?;
        let cluster = cluster.clone();
        let leader = addr.to_string();
        tokio::spawn(async move {
            if let Err(err) = serve(stream, cluster, leader).await {
                tracing::warn!(%peer, error = %err, "connection failed");
            }
        });
    }
}
