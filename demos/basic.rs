//! Basic example demonstrating the Red Canary API client.
//!
//! Run with:
//! ```
//! RED_CANARY_CUSTOMER_ID=demo RED_CANARY_API_KEY=your-key cargo run --example basic
//! ```

use canaryapi::{ApiResource, CanaryClient, Detection};

#[tokio::main]
async fn main() -> canaryapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Red Canary client...");
    let client = CanaryClient::from_env()?;
    println!("Connected to: {}", client.base_url());

    // Enumerate the ten most recent detections
    println!("\n--- Detections ---");
    let mut detections = Detection::all(&client).limit(10);
    println!("{} detections total", detections.size().await?);

    while let Some(mut detection) = detections.try_next().await? {
        println!("{}", detection.headline().await?);
        println!("  Date: {}", detection.date().await?);
        println!("  Severity: {}", detection.severity().await?);

        // The embedded endpoint is a snippet; hostname is already there,
        // operating_system forces a hydration fetch.
        let mut endpoint = detection.endpoint().await?;
        println!("  Hostname: {}", endpoint.hostname().await?);
        println!("  OS: {}", endpoint.operating_system().await?);

        // Walk the event timeline
        for mut entry in detection.timeline().await? {
            let ioc = if entry.is_ioc().await? { "IOC " } else { "" };
            println!(
                "    {} {}{}",
                entry.timestamp().await?,
                ioc,
                entry.entry_type().await?
            );
        }

        // Indicators are a nested paginated collection
        if detection.num_indicators().await? > 0 {
            let mut indicators = detection.indicators().await?;
            while let Some(mut indicator) = indicators.try_next().await? {
                println!("    indicator: {}", indicator.indicator_type().await?);
            }
        }
        println!();
    }

    println!("Done!");
    Ok(())
}
