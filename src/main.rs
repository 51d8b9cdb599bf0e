use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = accretion_jet::config::Config::parse();
    accretion_jet::app::init_tracing();
    accretion_jet::app::run(cfg)
}
