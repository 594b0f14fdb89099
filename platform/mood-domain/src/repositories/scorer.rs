/// Maps free text to a polarity. Implementations are pure; values outside
/// `[-1, 1]` are clamped by the caller.
pub trait SentimentScorer {
    fn polarity(&self, text: &str) -> f64;
}
