//! Ternary layer and model composition
//!
//! A layer is the full hardware pipeline for one convolution: im2col
//! lowering, ternary GEMM, folded batch-norm, activation, pooling. A model
//! chains layers and aggregates their MAC/skip statistics.
//!
//! Batch normalization is folded to a per-output-channel affine at layer
//! build time: `scale = gamma / sqrt(var + eps)`, `threshold = beta -
//! gamma * mean / sqrt(var + eps)`, applied as `y = scale * x + threshold`
//! right after GEMM and requantized (truncated toward zero) back into the
//! integer activation domain before the activation function.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::conv::{col2im, im2col, output_dims};
use crate::error::{Result, TritoneError};
use crate::gemm::{gemm_ternary, GemmStats};
use crate::mac::MacConfig;
use crate::matrix::{Matrix, Tensor};
use crate::trit::Trit;

/// Activation function select (fixed by the hardware ISA)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivationKind {
    /// Pass-through
    Identity,
    /// max(x, 0)
    Relu,
    /// Ternary sign: >0 -> +1, <0 -> -1, else 0
    Sign,
    /// Clip to [-scale, +scale]
    HardTanh,
}

/// Pooling select
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PoolingKind {
    None,
    Max,
    Avg,
}

/// Immutable configuration for one ternary layer
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub input_channels: usize,
    pub input_height: usize,
    pub input_width: usize,

    pub output_channels: usize,
    pub kernel_size: usize,
    pub stride: usize,
    pub padding: usize,

    pub activation: ActivationKind,
    /// Clip bound for HardTanh
    pub htanh_scale: i64,

    pub pooling: PoolingKind,
    pub pool_size: usize,

    pub mac: MacConfig,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            input_channels: 1,
            input_height: 8,
            input_width: 8,
            output_channels: 1,
            kernel_size: 3,
            stride: 1,
            padding: 1,
            activation: ActivationKind::Relu,
            htanh_scale: 1,
            pooling: PoolingKind::None,
            pool_size: 2,
            mac: MacConfig::default(),
        }
    }
}

impl LayerConfig {
    /// Spatial output dimensions of the convolution (pre-pooling)
    pub fn conv_output_dims(&self) -> (usize, usize) {
        output_dims(
            self.input_height,
            self.input_width,
            self.kernel_size,
            self.stride,
            self.padding,
        )
    }

    /// Weight tensor element count: OC * IC * kernel^2
    pub fn weight_len(&self) -> usize {
        self.output_channels * self.input_channels * self.kernel_size * self.kernel_size
    }
}

/// One ternary convolution layer.
///
/// Owns its (OC, IC, kernel, kernel) weight tensor - fixed for the layer's
/// lifetime - pre-reshaped to the (OC, IC * kernel^2) GEMM operand, plus
/// the folded batch-norm affine per output channel.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    config: LayerConfig,
    /// Weight tensor reshaped for GEMM: (OC, IC * kernel^2)
    weights_mat: Matrix<Trit>,
    bn_scale: Vec<f64>,
    bn_threshold: Vec<f64>,
}

impl Layer {
    /// Build a layer from a flat (OC, IC, kernel, kernel) weight tensor.
    ///
    /// Validates the element count and the ternary weight domain before
    /// construction; the reported position is (output channel, offset
    /// within that channel's filter).
    pub fn new(config: LayerConfig, weights: &[i64]) -> Result<Self> {
        if weights.len() != config.weight_len() {
            return Err(TritoneError::ShapeMismatch {
                expected: vec![
                    config.output_channels,
                    config.input_channels,
                    config.kernel_size,
                    config.kernel_size,
                ],
                actual: vec![weights.len()],
            });
        }

        let filter_len = config.input_channels * config.kernel_size * config.kernel_size;
        let mut data = Vec::with_capacity(weights.len());
        for (idx, &value) in weights.iter().enumerate() {
            let trit = Trit::from_i64(value).ok_or(TritoneError::InvalidWeight {
                value,
                row: idx / filter_len,
                col: idx % filter_len,
            })?;
            data.push(trit);
        }

        let weights_mat = Matrix::from_vec(config.output_channels, filter_len, data)?;
        Ok(Self {
            config,
            weights_mat,
            bn_scale: vec![1.0; config.output_channels],
            bn_threshold: vec![0.0; config.output_channels],
        })
    }

    /// Build a layer with uniform random ternary weights
    pub fn random<R: Rng>(config: LayerConfig, rng: &mut R) -> Self {
        let filter_len = config.input_channels * config.kernel_size * config.kernel_size;
        let weights_mat = Matrix::random_ternary(config.output_channels, filter_len, rng);
        Self {
            config,
            weights_mat,
            bn_scale: vec![1.0; config.output_channels],
            bn_threshold: vec![0.0; config.output_channels],
        }
    }

    /// Fold batch-norm parameters into the per-channel affine.
    ///
    /// BN: y = gamma * (x - mean) / sqrt(var + eps) + beta, folded to
    /// y = scale * x + threshold.
    pub fn set_batch_norm(
        &mut self,
        mean: &[f64],
        var: &[f64],
        gamma: &[f64],
        beta: &[f64],
    ) -> Result<()> {
        let oc = self.config.output_channels;
        for params in [mean, var, gamma, beta] {
            if params.len() != oc {
                return Err(TritoneError::ShapeMismatch {
                    expected: vec![oc],
                    actual: vec![params.len()],
                });
            }
        }

        const EPS: f64 = 1e-5;
        for ch in 0..oc {
            let std = (var[ch] + EPS).sqrt();
            self.bn_scale[ch] = gamma[ch] / std;
            self.bn_threshold[ch] = beta[ch] - gamma[ch] * mean[ch] / std;
        }
        Ok(())
    }

    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// The (OC, IC * kernel^2) GEMM weight operand
    pub fn weights_mat(&self) -> &Matrix<Trit> {
        &self.weights_mat
    }

    /// Forward pass: lower, multiply, normalize, activate, pool
    pub fn forward(&self, input: &Tensor) -> Result<(Tensor, GemmStats)> {
        let cfg = &self.config;
        let expected = (cfg.input_channels, cfg.input_height, cfg.input_width);
        if input.shape() != expected {
            return Err(TritoneError::ShapeMismatch {
                expected: vec![expected.0, expected.1, expected.2],
                actual: vec![input.channels(), input.height(), input.width()],
            });
        }

        // Lower to columns: (IC * k^2, OH * OW)
        let col = im2col(input, cfg.kernel_size, cfg.stride, cfg.padding);
        let (oh, ow) = cfg.conv_output_dims();

        // GEMM computes activations @ weights^T, so the columns transpose
        // into the activation operand: (OH * OW, IC * k^2) x (OC, IC * k^2)
        let (gemm_out, stats) = gemm_ternary(&col.transposed(), &self.weights_mat, &cfg.mac)?;

        // Back to channel-major (OC, OH * OW), with the folded batch-norm
        // affine applied and requantized (truncated toward zero)
        let mut normalized = Matrix::zeros(cfg.output_channels, oh * ow);
        for ch in 0..cfg.output_channels {
            for px in 0..oh * ow {
                let x = gemm_out.get(px, ch) as f64;
                let y = self.bn_scale[ch] * x + self.bn_threshold[ch];
                normalized.set(ch, px, y as i64);
            }
        }

        let mut output = col2im(&normalized, cfg.output_channels, oh, ow)?;
        output = apply_activation(&output, cfg.activation, cfg.htanh_scale);

        if cfg.pooling != PoolingKind::None {
            output = apply_pooling(&output, cfg.pooling, cfg.pool_size);
        }

        Ok((output, stats))
    }
}

/// Apply an activation function element-wise
pub fn apply_activation(input: &Tensor, kind: ActivationKind, htanh_scale: i64) -> Tensor {
    let (c, h, w) = input.shape();
    let mut out = Tensor::zeros(c, h, w);
    for ch in 0..c {
        for y in 0..h {
            for x in 0..w {
                let v = input.get(ch, y, x);
                let activated = match kind {
                    ActivationKind::Identity => v,
                    ActivationKind::Relu => v.max(0),
                    ActivationKind::Sign => Trit::from_sign(v).as_i64(),
                    ActivationKind::HardTanh => v.clamp(-htanh_scale, htanh_scale),
                };
                out.set(ch, y, x, activated);
            }
        }
    }
    out
}

/// Pool non-overlapping windows; average pooling truncates toward zero
pub fn apply_pooling(input: &Tensor, kind: PoolingKind, pool_size: usize) -> Tensor {
    if kind == PoolingKind::None {
        return input.clone();
    }

    let (c, h, w) = input.shape();
    let oh = h / pool_size;
    let ow = w / pool_size;
    let mut out = Tensor::zeros(c, oh, ow);

    for ch in 0..c {
        for oy in 0..oh {
            for ox in 0..ow {
                let mut max = i64::MIN;
                let mut sum: i64 = 0;
                for py in 0..pool_size {
                    for px in 0..pool_size {
                        let v = input.get(ch, oy * pool_size + py, ox * pool_size + px);
                        max = max.max(v);
                        sum += v;
                    }
                }
                let pooled = match kind {
                    PoolingKind::Max => max,
                    PoolingKind::Avg => sum / (pool_size * pool_size) as i64,
                    PoolingKind::None => unreachable!(),
                };
                out.set(ch, oy, ox, pooled);
            }
        }
    }
    out
}

/// Per-layer statistics, tagged with the layer's position in the model
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LayerStats {
    pub layer_index: usize,
    pub gemm: GemmStats,
    /// Output shape (C, H, W) after activation and pooling
    pub output_shape: (usize, usize, usize),
}

/// Ordered layer chain; the layer list is fixed after assembly
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Model {
    layers: Vec<Layer>,
}

impl Model {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Forward pass through every layer, feeding each output onward and
    /// collecting per-layer statistics.
    pub fn forward(&self, input: &Tensor) -> Result<(Tensor, Vec<LayerStats>)> {
        let mut x = input.clone();
        let mut all_stats = Vec::with_capacity(self.layers.len());

        for (layer_index, layer) in self.layers.iter().enumerate() {
            let (next, gemm) = layer.forward(&x)?;
            all_stats.push(LayerStats {
                layer_index,
                gemm,
                output_shape: next.shape(),
            });
            x = next;
        }

        Ok((x, all_stats))
    }

    /// Aggregate MAC accounting across all layers
    pub fn total_stats(stats: &[LayerStats]) -> GemmStats {
        let mut total = GemmStats::default();
        for s in stats {
            total.accumulate(&s.gemm);
        }
        total
    }
}
