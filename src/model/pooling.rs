use candle_core::{D, Result, Tensor};

/// `(batch, seq, H)` → `(batch, 2H)`: element-wise max over `seq`, then the mean.
///
/// Padding positions count towards both reductions.
pub fn max_mean_pool(xs: &Tensor) -> Result<Tensor> {
    let max = xs.max(1)?;
    let mean = xs.mean(1)?;
    Tensor::cat(&[&max, &mean], D::Minus1)
}

/// Pools both sentences into `[max_a, mean_a, max_b, mean_b]`.
pub fn pool_pair(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    let a = max_mean_pool(a)?;
    let b = max_mean_pool(b)?;
    Tensor::cat(&[&a, &b], D::Minus1)
}
