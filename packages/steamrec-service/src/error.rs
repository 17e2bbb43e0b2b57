pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Graph build cancelled after {processed} of {total} games.")]
	Cancelled { processed: usize, total: usize },
	#[error("Cache error: {message}")]
	Cache { message: String },
}
impl From<steamrec_storage::Error> for Error {
	fn from(err: steamrec_storage::Error) -> Self {
		Self::Cache { message: err.to_string() }
	}
}

impl From<steamrec_domain::Error> for Error {
	fn from(err: steamrec_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}
