//! Soft alignment between two encoded sentences.
//!
//! For `A: (batch, La, H)` and `B: (batch, Lb, H)` the affinity `E = A·Bᵀ` is a plain
//! dot product. Each row of `E` is softmax-normalised to attend over `B`, each column
//! to attend over `A`. Padding positions are not masked: they take part in both
//! softmaxes like any other position.

use candle_core::{D, Result, Tensor};
use candle_nn::ops::softmax;

/// Output of [`soft_align`].
#[derive(Debug, Clone)]
pub struct Alignment {
    /// `B` summarised for every position of `A`: `(batch, La, H)`.
    pub a_aligned: Tensor,
    /// `A` summarised for every position of `B`: `(batch, Lb, H)`.
    pub b_aligned: Tensor,
    /// Row-softmax of the affinity matrix: `(batch, La, Lb)`.
    pub a_weights: Tensor,
    /// Column-softmax of the affinity matrix, transposed: `(batch, Lb, La)`.
    pub b_weights: Tensor,
}

pub fn affinity(a: &Tensor, b: &Tensor) -> Result<Tensor> {
    a.matmul(&b.t()?.contiguous()?)
}

pub fn soft_align(a: &Tensor, b: &Tensor) -> Result<Alignment> {
    let e = affinity(a, b)?;

    let a_weights = softmax(&e, D::Minus1)?;
    let b_weights = softmax(&e.t()?.contiguous()?, D::Minus1)?;

    let a_aligned = a_weights.matmul(b)?;
    let b_aligned = b_weights.matmul(a)?;

    Ok(Alignment {
        a_aligned,
        b_aligned,
        a_weights,
        b_weights,
    })
}

/// `[x, aligned, x - aligned, x * aligned]` along the feature axis.
pub fn enrich(x: &Tensor, aligned: &Tensor) -> Result<Tensor> {
    let diff = x.sub(aligned)?;
    let prod = x.mul(aligned)?;
    Tensor::cat(&[x, aligned, &diff, &prod], D::Minus1)
}
