//! An endless ticker stopped by a cancellation token; the rest of the graph
//! drains and the sink completes on its own.
//!
//! Run with `cargo run --example cancellation`.

use std::time::Duration;

use pipeweld::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Cancellation Example ===");

    let ticker = Source::cancellable_with_config(
        |token: CancellationToken, out: Outbox<u64>| async move {
            let mut interval = tokio::time::interval(Duration::from_millis(20));
            let mut tick = 0;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        if out.send(tick).await.is_err() {
                            break;
                        }
                        tick += 1;
                    }
                }
            }
        },
        NodeConfig::new().name("ticker"),
    );
    let squares = Transform::new(|mut input: Inbox<u64>, out: Outbox<u64>| async move {
        while let Some(n) = input.recv().await {
            let _ = out.send(n * n).await;
        }
    });
    let printer = Sink::new(|input: Inbox<u64>| async move {
        use futures::StreamExt;

        let seen = input
            .into_stream()
            .inspect(|n| println!("square: {n}"))
            .count()
            .await;
        println!("printer saw {seen} items");
    });

    ticker.sends_to(&[&squares])?;
    squares.sends_to(&[&printer])?;

    let token = CancellationToken::new();
    ticker.start_with_cancellation(token.clone())?;

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("cancelling...");
    token.cancel();

    printer.done().wait().await?;
    println!("Cancellation example completed!\n");
    Ok(())
}
