//! volnote CLI: build inputs, price the note, run the whole workflow.
//!
//! Commands:
//! - `build-trade`: basket CSV to a validated `trade.json`
//! - `build-market`: market CSV to `market.json`
//! - `price`: price a trade/market JSON pair, write artifacts and manifest
//! - `run-all`: both builders and `price` into one output directory
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use volnote_runner::{
    build_market_file, build_trade_file, price_files, run_all, CancelToken, PricingReport,
    RunConfig, TradeDates,
};

#[derive(Parser)]
#[command(
    name = "volnote",
    about = "Monte Carlo pricer for a vol-target basket strategy note"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build trade.json from a basket CSV (ticker, weight, optional name).
    BuildTrade {
        #[arg(long)]
        basket_csv: PathBuf,

        #[arg(long)]
        out: PathBuf,

        /// Trade date (YYYY-MM-DD). Defaults to 2026-02-21.
        #[arg(long, value_parser = parse_date)]
        trade_date: Option<NaiveDate>,

        /// Final valuation date (YYYY-MM-DD). Defaults to 2031-01-21.
        #[arg(long, value_parser = parse_date)]
        valuation_date: Option<NaiveDate>,

        #[arg(long, default_value_t = 50)]
        min_names: usize,
    },
    /// Build market.json from a market CSV (ticker, spot, atm_vol, div_yield).
    BuildMarket {
        #[arg(long)]
        market_csv: PathBuf,

        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value_t = 0.0366)]
        sofr_flat: f64,

        #[arg(long, default_value_t = 0.8)]
        rho: f64,
    },
    /// Price a trade/market pair.
    Price {
        #[arg(long)]
        trade: PathBuf,

        #[arg(long)]
        market: PathBuf,

        #[arg(long, default_value = "outputs")]
        outdir: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Build trade and market from CSV, then price.
    RunAll {
        #[arg(long)]
        basket_csv: PathBuf,

        #[arg(long)]
        market_csv: PathBuf,

        #[arg(long, default_value = "outputs")]
        outdir: PathBuf,

        /// Replace output files left by a previous run.
        #[arg(long, default_value_t = false)]
        overwrite: bool,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Run parameters. Flags override the TOML config, which overrides defaults.
#[derive(Args, Debug)]
struct RunArgs {
    /// TOML run config.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    paths: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    rho: Option<f64>,

    #[arg(long)]
    sofr_flat: Option<f64>,

    #[arg(long)]
    v_millions: Option<f64>,

    #[arg(long)]
    min_names: Option<usize>,

    /// Compute greeks (the default).
    #[arg(long, overrides_with = "no_greeks")]
    greeks: bool,

    /// Skip greeks.
    #[arg(long, overrides_with = "greeks")]
    no_greeks: bool,
}

impl RunArgs {
    fn resolve(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::default(),
        };

        if let Some(paths) = self.paths {
            config.paths = paths;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rho) = self.rho {
            config.rho = rho;
        }
        if let Some(rate) = self.sofr_flat {
            config.sofr_flat = rate;
        }
        if let Some(v) = self.v_millions {
            config.v_millions = v;
        }
        if let Some(n) = self.min_names {
            config.min_names = n;
        }
        if self.greeks {
            config.greeks = true;
        }
        if self.no_greeks {
            config.greeks = false;
        }

        config.validate().context("invalid run parameters")?;
        tracing::debug!(?config, run_id = %config.run_id(), "resolved run config");
        Ok(config)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::BuildTrade {
            basket_csv,
            out,
            trade_date,
            valuation_date,
            min_names,
        } => {
            let dates = TradeDates {
                trade_date,
                valuation_date,
            };
            let trade = build_trade_file(&basket_csv, &out, dates, min_names)
                .with_context(|| format!("building trade from {}", basket_csv.display()))?;
            println!(
                "Trade with {} names written to {}",
                trade.basket_size(),
                out.display()
            );
            Ok(())
        }
        Commands::BuildMarket {
            market_csv,
            out,
            sofr_flat,
            rho,
        } => {
            let market = build_market_file(&market_csv, &out, sofr_flat, rho)
                .with_context(|| format!("building market from {}", market_csv.display()))?;
            println!(
                "Market with {} equities written to {}",
                market.equities.len(),
                out.display()
            );
            Ok(())
        }
        Commands::Price {
            trade,
            market,
            outdir,
            run,
        } => {
            let config = run.resolve()?;
            let report = price_files(&trade, &market, &outdir, &config, &CancelToken::new())
                .with_context(|| format!("pricing {}", trade.display()))?;
            print_summary(&report, &outdir);
            Ok(())
        }
        Commands::RunAll {
            basket_csv,
            market_csv,
            outdir,
            overwrite,
            run,
        } => {
            let config = run.resolve()?;
            let report = run_all(
                &basket_csv,
                &market_csv,
                &outdir,
                &config,
                overwrite,
                &CancelToken::new(),
            )
            .context("run-all failed")?;
            print_summary(&report, &outdir);
            Ok(())
        }
    }
}

fn print_summary(report: &PricingReport, outdir: &Path) {
    let r = &report.valuation.result;
    let d = &report.valuation.diagnostics;

    println!();
    println!("=== Pricing Summary ===");
    println!(
        "Premium:      {:.6} ({:.4} per 100)",
        r.premium_rate, r.premium_per_100
    );
    println!(
        "Std error:    {:.6} ({:.4} per 100)",
        r.stderr_rate, r.stderr_per_100
    );
    println!(
        "Grid:         {} paths x {} steps over {:.3}y",
        d.effective_paths, d.effective_steps, r.config.t_years
    );
    println!(
        "Exposure:     avg {:.4}  min {:.4}  max {:.4}",
        d.avg_exposure, d.min_exposure, d.max_exposure
    );
    println!("Avg sigma:    {:.4}", d.avg_sigma_hat);

    if let Some(rows) = &report.valuation.greeks {
        println!();
        println!("=== Greeks ===");
        for g in rows {
            println!("{:<16} {:>14.6}", g.name, g.value);
        }
    }

    println!();
    println!("Artifacts saved to: {}", outdir.display());
}
