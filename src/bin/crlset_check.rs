//! Demo tool: download the latest CRLSet and optionally check one
//! certificate against it.
//!
//! Usage: `crlset_check [<spki-hash-hex> <serial-hex>]`

use crlset_fetch::{
    config::Config,
    crlset::RevocationStatus,
    fetch::HttpFetcher,
    telemetry,
    updater::{CrlSetUpdater, UpdatePolicy},
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);
    let update = config.update;

    let fetcher = HttpFetcher::new(
        &update.endpoint,
        &update.component_id,
        &update.version,
        update.timeout_secs,
    )?;
    let updater = CrlSetUpdater::new(fetcher, update.component_id.clone())
        .with_probe_bytes(update.probe_bytes);

    let set = updater.load_latest(true, UpdatePolicy::OnExpiry).await?;
    println!(
        "CRLSet sequence {} ({} issuers, {} blocked SPKIs, NotAfter {})",
        set.sequence(),
        set.revocations().len(),
        set.header().blocked_spkis.len(),
        set.header().not_after,
    );

    let mut args = std::env::args().skip(1);
    if let (Some(spki_hash), Some(serial)) = (args.next(), args.next()) {
        match set.check(&spki_hash, &serial) {
            RevocationStatus::Ok => println!("not revoked"),
            RevocationStatus::RevokedBySpki => println!("revoked: issuer SPKI is blocked"),
            RevocationStatus::RevokedBySerial => println!("revoked: serial listed by issuer"),
        }
    }

    Ok(())
}
