// crates.io
use clap::Parser;
// self
use steamrec_predict::Args;

fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();
	steamrec_predict::run(args)
}
