pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
	#[error("Tag histogram is empty or sums to zero.")]
	EmptyHistogram,
	#[error("Invalid weight {weight} for tag {tag}.")]
	InvalidWeight { tag: String, weight: f64 },
	#[error("Invalid time window: start {start_ms} must be before end {end_ms}.")]
	InvalidWindow { start_ms: i64, end_ms: i64 },
}
