//! # Tritone - Golden Reference Model
//!
//! Functional reference model for the Tritone TPU: a ternary tensor
//! accelerator whose weights are restricted to {-1, 0, +1}. The model
//! defines the exact expected numeric behavior of every hardware unit,
//! generates deterministic test vectors for the SystemVerilog testbench,
//! and is the oracle for bit-for-bit checking of simulation output.
//!
//! ## Core Components
//!
//! - **Trit / Codec**: balanced-ternary digits with two distinct 2-bit
//!   hardware field encodings (general values vs. weights)
//! - **MAC / GEMM**: zero-skip ternary multiply-accumulate and the dense
//!   matrix multiply built on it, with MAC accounting
//! - **Systolic**: weight-stationary cycle-stepped timing model; its
//!   converged grid must equal the GEMM result
//! - **Nonlinear / Rsqrt**: fixed-point approximation units with sentinel
//!   edge policies (the hardware has no exception path)
//! - **Reduce**: saturating sum/abssum, selecting max/min
//! - **Conv / Layer**: im2col lowering, folded batch-norm, activation,
//!   pooling, multi-layer inference
//!
//! ## Design Principles
//!
//! - **Integer exact**: the MAC/GEMM/systolic datapath is pure integer
//!   arithmetic with explicit saturation; no floating-point drift
//! - **Closed domains**: weights are a closed enum, invalid values are
//!   rejected once at the boundary and unrepresentable after
//! - **Explicit configuration**: array sizes, trit widths and fractional
//!   bits travel in config structs, never module constants
//! - **Deterministic**: pure functions over immutable inputs; fixed
//!   accumulation and cycle order, seeded vector generation
//!
//! ## Example
//!
//! ```
//! use tritone::{gemm, mac::MacConfig, matrix::Matrix};
//!
//! let activations = Matrix::from_vec(1, 5, vec![10, 20, -15, 0, 50])?;
//! let weights = Matrix::from_vec(1, 5, vec![1, -1, 1, 0, -1])?;
//! let (output, stats) = gemm(&activations, &weights, &MacConfig::default())?;
//! assert_eq!(output.get(0, 0), -75);
//! assert_eq!(stats.zero_skipped, 1);
//! # Ok::<(), tritone::TritoneError>(())
//! ```

mod error;
pub use error::{Result, TritoneError};

// Trit - the ternary digit/weight domain
mod trit;
pub use trit::Trit;

// Balanced-ternary codec and hardware field packing
pub mod codec;
pub use codec::{GeneralCode, WeightCode};

// Operand containers
pub mod matrix;
pub use matrix::{Matrix, Tensor};

// MAC unit and dense GEMM
pub mod mac;
pub use mac::MacConfig;
pub mod gemm;
pub use gemm::{gemm, gemm_ternary, GemmStats};

// Weight-stationary systolic timing model
pub mod systolic;
pub use systolic::{
    estimate_cycles, systolic_gemm, CycleEstimate, Snapshot, SystolicArray, SystolicConfig,
};

// Fixed-point function units
pub mod nonlinear;
pub use nonlinear::{apply_slice as apply_nonlinear, NonlinearConfig, NonlinearFn};
pub mod rsqrt;
pub use rsqrt::{rsqrt, RsqrtConfig, RSQRT_MAX};
pub mod reduce;
pub use reduce::{reduce, ReduceOp, ReduceTiming};

// Convolution lowering and layer/model composition
pub mod conv;
pub use conv::{col2im, im2col};
pub mod layer;
pub use layer::{ActivationKind, Layer, LayerConfig, LayerStats, Model, PoolingKind};

// RTL test-vector emission
pub mod vectors;
