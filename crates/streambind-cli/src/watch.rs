//! Watch an SSE endpoint and print every result transition.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use streambind_core::{transform, BindingConfig, HttpTransport, Status, StreamBinding};
use tracing::info;

pub async fn run(
    url: String,
    event: Option<String>,
    raw: bool,
    with_credentials: bool,
) -> anyhow::Result<()> {
    let transport = Arc::new(HttpTransport::new()?);
    let mut binding: StreamBinding<String> = StreamBinding::new(transport);

    let mut config = BindingConfig::new(&url).with_credentials(with_credentials);
    if let Some(event) = event {
        config = config.event(event);
    }
    if !raw {
        // Parse the payload as JSON and tag it with a received-message
        // counter before pretty-printing.
        let count = AtomicUsize::new(0);
        config = config.transform(transform(move |payload| {
            let mut value: serde_json::Value = serde_json::from_str(&payload)?;
            if let Some(object) = value.as_object_mut() {
                object.insert(
                    "count".to_string(),
                    count.fetch_add(1, Ordering::SeqCst).into(),
                );
            }
            Ok(serde_json::to_string_pretty(&value)?)
        }));
    }
    binding.bind(config);

    let mut rx = binding.subscribe();
    info!("Watching {}", url);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                changed?;
                let result = rx.borrow_and_update().clone();
                match result.status {
                    Status::Pending => println!("pending..."),
                    Status::Success => {
                        println!("{}", result.data.unwrap_or_default());
                    }
                    Status::Error => println!("error occurred while fetching data"),
                }
            }
        }
    }

    binding.close();
    Ok(())
}
