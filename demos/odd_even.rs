//! Two counters feeding an odd and an even filter, each tagging what it
//! lets through, all merged into one printer.
//!
//! Run with `cargo run --example odd_even`.

use pipeweld::prelude::*;

async fn count(from: i64, to: i64, out: Outbox<i64>) {
    for n in from..=to {
        if out.send(n).await.is_err() {
            break;
        }
    }
}

fn parity_filter(keep: i64) -> Transform<i64, i64> {
    Transform::new(move |mut input: Inbox<i64>, out: Outbox<i64>| async move {
        while let Some(n) = input.recv().await {
            if n.rem_euclid(2) == keep {
                let _ = out.send(n).await;
            }
        }
    })
}

fn tagger(label: &'static str) -> Transform<i64, String> {
    Transform::with_config(
        move |mut input: Inbox<i64>, out: Outbox<String>| async move {
            while let Some(n) = input.recv().await {
                let _ = out.send(format!("{label}: {n}")).await;
            }
        },
        NodeConfig::new().name(label),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Odd/Even Graph Example ===");

    let low = Source::new(|out: Outbox<i64>| count(1, 3, out));
    let high = Source::new(|out: Outbox<i64>| count(6, 8, out));
    let odds = parity_filter(1);
    let evens = parity_filter(0);
    let odd_tags = tagger("odd");
    let even_tags = tagger("even");
    let printer = Sink::with_config(
        |mut input: Inbox<String>| async move {
            while let Some(line) = input.recv().await {
                println!("{line}");
            }
        },
        NodeConfig::new().name("printer").buffer_capacity(4),
    );

    low.sends_to(&[&odds, &evens])?;
    high.sends_to(&[&odds, &evens])?;
    odds.sends_to(&[&odd_tags])?;
    evens.sends_to(&[&even_tags])?;
    odd_tags.sends_to(&[&printer])?;
    even_tags.sends_to(&[&printer])?;

    low.start()?;
    high.start()?;
    printer.done().wait().await?;

    println!("Odd/even graph completed!\n");
    Ok(())
}
