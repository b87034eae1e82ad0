#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use staffing_tool::{AllocationLedger, Dataset, http_api, load_dataset_from_json};

    let addr: SocketAddr = std::env::var("STAFFING_TOOL_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let (dataset, ledger) = match std::env::var("STAFFING_TOOL_DATA") {
        Ok(path) => load_dataset_from_json(&path)?,
        Err(_) => (Dataset::default(), AllocationLedger::new()),
    };

    println!("staffing-tool HTTP API listening on http://{addr}");
    http_api::serve(addr, dataset, ledger).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
