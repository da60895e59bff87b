pub mod chunking;
pub mod extract;
pub mod handlers;
pub mod ingest;
