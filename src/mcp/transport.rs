//! NDJSON transport over stdin/stdout.
//!
//! A reader task decodes request lines into a bounded channel so input keeps
//! draining while a tool call is in flight. The dispatch loop handles one
//! frame at a time, which keeps responses in receive order and serializes
//! every history read-modify-write.

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::handler::BridgeServer;
use crate::rpc::codec::{Frame, RpcCodec};
use crate::rpc::{Response, RpcError};
use crate::{AppError, Result};

/// Frames buffered between the reader task and the dispatch loop.
const INBOUND_CAPACITY: usize = 64;

/// Serve `server` over stdin/stdout until EOF or cancellation.
///
/// # Errors
///
/// Returns `AppError::Io` if stdin or stdout fails.
pub async fn serve_stdio(server: BridgeServer, ct: CancellationToken) -> Result<()> {
    info!(mode = server.state().mode.tool_name(), "starting stdio transport");
    let result = serve(server, tokio::io::stdin(), tokio::io::stdout(), ct).await;
    info!("stdio transport shut down");
    result
}

/// Serve `server` over an arbitrary byte stream pair.
///
/// Returns once `input` reaches EOF and every received request has been
/// answered, or as soon as `ct` fires. A call in flight at cancellation is
/// dropped, which kills its subprocess.
///
/// # Errors
///
/// Returns `AppError::Io` if reading `input` or writing `output` fails.
pub async fn serve<R, W>(
    server: BridgeServer,
    input: R,
    output: W,
    ct: CancellationToken,
) -> Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin,
{
    let (frame_tx, mut frame_rx) = mpsc::channel(INBOUND_CAPACITY);
    let reader = tokio::spawn(read_frames(input, frame_tx, ct.clone()));
    let mut writer = FramedWrite::new(output, RpcCodec::new());

    loop {
        let frame = tokio::select! {
            biased;
            () = ct.cancelled() => {
                debug!("transport: cancellation received, stopping");
                break;
            }
            frame = frame_rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        let response = tokio::select! {
            biased;
            () = ct.cancelled() => {
                debug!("transport: cancelled during request, stopping");
                break;
            }
            response = handle_frame(&server, frame) => response,
        };

        if let Some(response) = response {
            writer.send(serde_json::to_string(&response)?).await?;
        }
    }

    reader.abort();
    match reader.await {
        Ok(result) => result,
        Err(err) if err.is_cancelled() => Ok(()),
        Err(err) => Err(AppError::Io(format!("reader task failed: {err}"))),
    }
}

async fn handle_frame(server: &BridgeServer, frame: Frame) -> Option<Response> {
    match frame {
        Frame::Line(line) => server.handle_line(&line).await,
        Frame::Malformed(reason) => {
            warn!(reason, "transport: dropping malformed line");
            Some(Response::failure(
                serde_json::Value::Null,
                RpcError::parse(reason),
            ))
        }
    }
}

async fn read_frames<R>(input: R, frame_tx: mpsc::Sender<Frame>, ct: CancellationToken) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut framed = FramedRead::new(input, RpcCodec::new());

    loop {
        tokio::select! {
            biased;
            () = ct.cancelled() => break,
            item = framed.next() => match item {
                None => {
                    debug!("transport: input closed");
                    break;
                }
                Some(Ok(frame)) => {
                    if frame_tx.send(frame).await.is_err() {
                        break;
                    }
                }
                Some(Err(err)) => {
                    warn!(%err, "transport: input failed, stopping");
                    return Err(err);
                }
            },
        }
    }

    Ok(())
}
