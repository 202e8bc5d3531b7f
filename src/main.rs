mod cli;
mod tables;

use anyhow::Context;
use clap::{Parser, crate_version};
use imbalance_prices::{
    PriceTable,
    Reconciler,
    api::entsoe,
    cache::CacheFile,
    prelude::{info, warn},
};

use crate::{
    cli::{Args, Command, FetchArgs, ShowArgs},
    tables::build_price_table,
};

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Fetch(args) => fetch(&args)?,
        Command::Show(args) => show(&args)?,
    }

    info!("done!");
    Ok(())
}

fn fetch(args: &FetchArgs) -> anyhow::Result<()> {
    let reconciler = Reconciler::builder()
        .transport(entsoe::Api::new(args.timeout()))
        .maybe_security_token(args.security_token.clone())
        .chunk_width(args.chunk_width())
        .store(Box::new(CacheFile::new(&args.cache.path)))
        .build();
    let prices = reconciler
        .fetch(args.area, args.start, args.end, None, args.persist)
        .with_context(|| format!("failed to fetch the prices for {:?}", args.area))?;

    let n_expected = args.n_expected_rows()?;
    if prices.len() == n_expected {
        info!(n_rows = prices.len(), "fetched");
    } else {
        warn!(n_rows = prices.len(), n_expected, "the table does not cover the whole window");
    }
    print(&prices, args.json)
}

fn show(args: &ShowArgs) -> anyhow::Result<()> {
    let prices = CacheFile::new(&args.cache.path)
        .load()
        .with_context(|| format!("failed to load `{}`", args.cache.path.display()))?;
    info!(n_rows = prices.len(), "loaded");
    print(&prices, args.json)
}

fn print(prices: &PriceTable, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&**prices)?);
    } else {
        println!("{}", build_price_table(prices));
    }
    Ok(())
}
