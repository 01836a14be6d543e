pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(
		"Vector for record {record_id} has {actual} dimensions, index {index} expects {expected}."
	)]
	DimensionMismatch { index: String, record_id: uuid::Uuid, expected: usize, actual: usize },
	#[error("Record {record_id} is already present in index {index}.")]
	DuplicateId { index: String, record_id: uuid::Uuid },
	#[error("Query vector has {actual} dimensions, index {index} expects {expected}.")]
	QueryDimensionMismatch { index: String, expected: usize, actual: usize },
}
