//! SQL for each table family. Every function takes a borrowed connection so
//! callers decide between the writer and the read pool.

pub mod codec;
pub mod embedding_ops;
pub mod feedback_ops;
pub mod intent_ops;
pub mod snapshot_ops;
pub mod suggestion_ops;
pub mod template_ops;
