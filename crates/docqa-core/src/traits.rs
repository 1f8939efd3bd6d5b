/// Maps text to fixed-dimension vectors. Every vector an embedder returns has
/// length `dim()`.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }
}

/// Single-turn text completion.
pub trait Generator: Send + Sync {
    fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
