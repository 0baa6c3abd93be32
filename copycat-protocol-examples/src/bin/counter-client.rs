//! Drives one session through its whole lifecycle against `counter-server`.
//!
//! Run with: cargo run --bin counter-client

use copycat_protocol::prelude::*;
use copycat_protocol_examples::{FramedStream, decode_counter, server_addr};
use tokio::net::TcpStream;

struct Client {
    framed: FramedStream<TcpStream>,
}

impl Client {
    async fn call(&mut self, request: impl Into<AnyRequest>) -> anyhow::Result<AnyResponse> {
        let request = request.into();
        tracing::info!(%request, "sending");
        let bytes = request.to_frame(self.framed.serializer())?;
        self.framed.write_frame(bytes).await?;

        let response = self
            .framed
            .read_response()
            .await?
            .ok_or_else(|| anyhow::anyhow!("server closed the connection"))?;
        tracing::info!(%response, "received");
        Ok(response)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let limits = MessageLimits::new()
        .send_max_bytes(64 * 1024)
        .receive_max_bytes(64 * 1024);
    let stream = TcpStream::connect(server_addr()?).await?;
    let mut client = Client {
        framed: FramedStream::new(stream, Serializer::new().with_limits(limits)),
    };

    let open = OpenSessionRequest::builder()
        .with_client("counter-client")
        .with_name("visits")
        .with_type("counter")
        .with_timeout(5000)?
        .build()?;
    let AnyResponse::OpenSession(opened) = client.call(open).await? else {
        anyhow::bail!("unexpected response kind");
    };
    if let Some(kind) = opened.error() {
        anyhow::bail!("failed to open session: {kind}");
    }
    let session = opened.session();

    let mut sequence = 0;
    for _ in 0..3 {
        sequence += 1;
        let command = CommandRequest::builder()
            .with_session(session)?
            .with_sequence(sequence)?
            .with_operation(&b"incr"[..])
            .build()?;
        client.call(command).await?;
    }

    let query = QueryRequest::builder()
        .with_session(session)?
        .with_sequence(sequence)?
        .with_consistency(ConsistencyLevel::Sequential)
        .with_operation(&b"get"[..])
        .build()?;
    if let AnyResponse::Query(response) = client.call(query).await?
        && response.envelope().is_ok()
    {
        let value = decode_counter(response.result().clone())?;
        tracing::info!(value, "counter value");
    }

    let keep_alive = KeepAliveRequest::builder()
        .with_session(session)?
        .with_command_sequence(sequence)?
        .build()?;
    client.call(keep_alive).await?;

    let close = CloseSessionRequest::builder().with_session(session)?.build()?;
    client.call(close).await?;

    // the session is gone now, so the cluster reports unknown_session
    let stale = CommandRequest::builder()
        .with_session(session)?
        .with_sequence(sequence + 1)?
        .with_operation(&b"incr"[..])
        .build()?;
    let response = client.call(stale).await?;
    tracing::info!(%response, "command after close");

    Ok(())
}
