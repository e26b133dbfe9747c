use clap::Parser;

mod platform;

fn main() -> anyhow::Result<()> {
    let cli = platform::settings::Cli::parse();
    platform::run_app(cli)
}
