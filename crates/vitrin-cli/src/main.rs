use clap::Parser;
use vitrin_cli::{CliArgs, VitrinCli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> vitrin_core::Result<()> {
    let args = CliArgs::parse();
    let cli = VitrinCli::from_args("vitrin", &args)?;
    cli.run(args).await
}
