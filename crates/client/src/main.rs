//! `stockroom [SEARCH]`: load the catalog and print the matching items.

use anyhow::Context;

use stockroom_client::{ClientConfig, HttpSheetGateway, Session};
use stockroom_inventory::Filter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stockroom_observability::init();

    let config = ClientConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        sheet_url = %config.sheet_url,
        write_mode = ?config.write_mode,
        "Starting stockroom"
    );

    let session = Session::new(HttpSheetGateway::from_config(&config)).with_notice_ttl(config.notice_ttl);

    // A failed load leaves an empty catalog; the notice says why.
    if let Err(err) = session.load().await {
        tracing::error!("{}", err);
        if let Some(notice) = session.current_notice() {
            eprintln!("{}", notice.message);
        }
    }

    let search = std::env::args().nth(1).unwrap_or_default();
    let view = session.catalog_view(&Filter::default().with_search(&search));

    match view.empty_message {
        Some(message) => println!("{message}"),
        None => {
            for card in &view.cards {
                println!("{card}");
            }
        }
    }

    Ok(())
}
