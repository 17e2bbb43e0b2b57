use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};

pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
}

/// Parses a `NAME=VALUE` pair as used by repeated `--tag` arguments.
pub fn parse_key_value(raw: &str) -> Result<(String, f64), String> {
	let (key, value) =
		raw.rsplit_once('=').ok_or_else(|| format!("Expected NAME=VALUE, got `{raw}`."))?;
	let key = key.trim();

	if key.is_empty() {
		return Err(format!("Missing name in `{raw}`."));
	}

	let value = value
		.trim()
		.parse::<f64>()
		.map_err(|err| format!("Invalid value in `{raw}`: {err}."))?;

	Ok((key.to_string(), value))
}
