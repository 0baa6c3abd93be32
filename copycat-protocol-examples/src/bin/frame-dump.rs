//! Prints the framed wire bytes of one message of every kind.
//!
//! Run with: cargo run --bin frame-dump

use copycat_protocol::prelude::*;

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let serializer = Serializer::new();

    let requests: Vec<AnyRequest> = vec![
        OpenSessionRequest::builder()
            .with_client("c1")
            .with_name("lock-a")
            .with_type("lock")
            .with_timeout(5000)?
            .build()?
            .into(),
        KeepAliveRequest::builder().with_session(1)?.build()?.into(),
        CommandRequest::builder()
            .with_session(1)?
            .with_sequence(1)?
            .with_operation(&b"lock"[..])
            .build()?
            .into(),
        QueryRequest::builder()
            .with_session(1)?
            .with_operation(&b"owner"[..])
            .build()?
            .into(),
        CloseSessionRequest::builder().with_session(1)?.build()?.into(),
    ];

    let responses: Vec<AnyResponse> = vec![
        OpenSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_session(1)?
            .with_timeout(5000)?
            .build()?
            .into(),
        KeepAliveResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_leader("127.0.0.1:5000")
            .build()?
            .into(),
        CommandResponse::builder()
            .with_error(ErrorKind::Command)
            .build()?
            .into(),
        QueryResponse::builder()
            .with_status(ResponseStatus::Ok)
            .with_index(1)?
            .with_result(&b"c1"[..])
            .build()?
            .into(),
        CloseSessionResponse::builder()
            .with_status(ResponseStatus::Ok)
            .build()?
            .into(),
    ];

    for request in &requests {
        let frame = request.to_frame(&serializer)?;
        println!("request  {:<14} {}", request.kind(), hex(&frame));
    }
    for response in &responses {
        let frame = response.to_frame(&serializer)?;
        println!("response {:<14} {}", response.kind(), hex(&frame));
    }

    Ok(())
}
