use crate::errors::PipelineError;
use crate::value_objects::observation::CommentRecord;

/// Lazy, finite, newest-first stream of comments. Items fail individually
/// when a page cannot be fetched; the stream cannot be restarted.
pub type CommentStream<'a> = Box<dyn Iterator<Item = Result<CommentRecord, PipelineError>> + 'a>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentQuery {
    pub feed: String,
    pub limit: usize,
}

pub trait CommentSource {
    fn comments(&self, query: &CommentQuery) -> Result<CommentStream<'_>, PipelineError>;
}
