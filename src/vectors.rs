//! RTL test-vector emission
//!
//! Writes the memory-image files consumed by the SystemVerilog testbench:
//! one hex value per line (`$readmemh` format), `//` comment headers, and a
//! plain `key=value` sidecar with dimensions and aggregate totals per test
//! case. Activation/accumulator fields use the general 2-bit code, weight
//! fields the weight code - see [`crate::codec`].
//!
//! Generation is deterministic: every vector family draws from a seeded
//! `StdRng`, so regeneration reproduces the files bit-for-bit.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::codec;
use crate::error::Result;
use crate::gemm::{gemm_ternary, GemmStats};
use crate::mac::{mac, MacConfig};
use crate::matrix::Matrix;
use crate::trit::Trit;

/// Seed for the GEMM vector family
pub const GEMM_SEED: u64 = 42;

/// Representative stimulus sets for the single-MAC sweep
const MAC_ACTIVATIONS: [i64; 9] = [0, 1, -1, 127, -128, 42, -42, 100, -100];
const MAC_ACCUMULATORS: [i64; 5] = [0, 1000, -1000, 5_000_000, -5_000_000];
const WEIGHTS: [Trit; 3] = [Trit::Negative, Trit::Zero, Trit::Positive];

/// PE stimulus stream (the documented MAC trace)
const PE_ACTIVATIONS: [i64; 5] = [10, 20, -15, 0, 50];

/// One generated GEMM test case with its golden output
#[derive(Clone, Debug)]
pub struct GemmCase {
    pub name: String,
    pub activations: Matrix<i64>,
    pub weights: Matrix<Trit>,
    pub expected: Matrix<i64>,
    pub stats: GemmStats,
}

impl GemmCase {
    /// Draw random operands and compute the golden output
    pub fn generate(
        m: usize,
        k: usize,
        n: usize,
        rng: &mut StdRng,
        config: &MacConfig,
    ) -> Result<Self> {
        let activations = Matrix::random(m, k, -1000, 1000, rng);
        let weights = Matrix::random_ternary(n, k, rng);
        let (expected, stats) = gemm_ternary(&activations, &weights, config)?;
        Ok(Self {
            name: format!("matmul_{}x{}x{}", m, k, n),
            activations,
            weights,
            expected,
            stats,
        })
    }
}

/// Write the single-MAC sweep: every weight against representative
/// activation/accumulator values. Returns the vector count.
pub fn write_mac_vectors(output_dir: &Path, config: &MacConfig) -> Result<usize> {
    fs::create_dir_all(output_dir)?;
    let mut f = BufWriter::new(File::create(output_dir.join("mac_test_vectors.txt"))?);

    let total = MAC_ACTIVATIONS.len() * MAC_ACCUMULATORS.len() * WEIGHTS.len();
    writeln!(f, "// MAC Unit Test Vectors")?;
    writeln!(f, "// Format: activation weight acc_in | acc_out zero_skip")?;
    writeln!(
        f,
        "// Activation: {}-trit signed, Weight: 2-bit, Acc: {}-trit signed",
        config.activation_trits, config.accumulator_trits
    )?;
    writeln!(f, "// Total vectors: {}", total)?;
    writeln!(f, "//")?;

    for act in MAC_ACTIVATIONS {
        for acc in MAC_ACCUMULATORS {
            for weight in WEIGHTS {
                let (acc_out, skipped) = mac(act, weight, acc, config);
                writeln!(
                    f,
                    "{} {} {} {} {}",
                    codec::encode_hex(act, config.activation_trits)?,
                    codec::weight_field_bin(weight),
                    codec::encode_hex(acc, config.accumulator_trits)?,
                    codec::encode_hex(acc_out, config.accumulator_trits)?,
                    skipped as u8
                )?;
            }
        }
    }
    Ok(total)
}

/// Write the processing-element stream vectors: weight load followed by the
/// activation/partial-sum stream for each weight value.
pub fn write_pe_vectors(output_dir: &Path, config: &MacConfig) -> Result<usize> {
    fs::create_dir_all(output_dir)?;
    let mut f = BufWriter::new(File::create(output_dir.join("pe_test_vectors.txt"))?);

    let total = WEIGHTS.len() * PE_ACTIVATIONS.len();
    writeln!(f, "// PE Test Vectors")?;
    writeln!(
        f,
        "// Format: weight weight_load act_in psum_in | act_out psum_out"
    )?;
    writeln!(f, "// Total vectors: {}", total)?;
    writeln!(f, "//")?;

    for weight in WEIGHTS {
        let mut psum: i64 = 0;
        for (i, act) in PE_ACTIVATIONS.iter().enumerate() {
            let (psum_out, _) = mac(*act, weight, psum, config);
            // Activations pass through the PE unchanged
            writeln!(
                f,
                "{} {} {} {} {} {}",
                codec::weight_field_bin(weight),
                u8::from(i == 0),
                codec::encode_hex(*act, config.activation_trits)?,
                codec::encode_hex(psum, config.accumulator_trits)?,
                codec::encode_hex(*act, config.activation_trits)?,
                codec::encode_hex(psum_out, config.accumulator_trits)?,
            )?;
            psum = psum_out;
        }
    }
    Ok(total)
}

/// Write one GEMM test case: operand and expected memory images plus the
/// `key=value` sidecar. Returns the case directory.
pub fn write_gemm_case(output_dir: &Path, case: &GemmCase, config: &MacConfig) -> Result<PathBuf> {
    let case_dir = output_dir.join(&case.name);
    fs::create_dir_all(&case_dir)?;

    let m = case.activations.rows();
    let k = case.activations.cols();
    let n = case.weights.rows();

    let mut f = BufWriter::new(File::create(case_dir.join("activations.mem"))?);
    writeln!(f, "// Activations: {}x{} matrix", m, k)?;
    for i in 0..m {
        for j in 0..k {
            writeln!(
                f,
                "{}",
                codec::encode_hex(case.activations.get(i, j), config.activation_trits)?
            )?;
        }
    }

    let mut f = BufWriter::new(File::create(case_dir.join("weights.mem"))?);
    writeln!(f, "// Weights: {}x{} matrix (ternary)", n, k)?;
    for i in 0..n {
        for j in 0..k {
            writeln!(f, "{}", codec::weight_field_bin(case.weights.get(i, j)))?;
        }
    }

    let mut f = BufWriter::new(File::create(case_dir.join("expected.mem"))?);
    writeln!(f, "// Expected output: {}x{} matrix", m, n)?;
    for i in 0..m {
        for j in 0..n {
            writeln!(
                f,
                "{}",
                codec::encode_hex(case.expected.get(i, j), config.accumulator_trits)?
            )?;
        }
    }

    let mut f = BufWriter::new(File::create(case_dir.join("config.txt"))?);
    writeln!(f, "M={}", m)?;
    writeln!(f, "K={}", k)?;
    writeln!(f, "N={}", n)?;
    writeln!(f, "TOTAL_MACS={}", case.stats.total_macs)?;
    writeln!(f, "ZERO_SKIPPED={}", case.stats.zero_skipped)?;
    writeln!(f, "EFFECTIVE_MACS={}", case.stats.effective_macs())?;

    Ok(case_dir)
}

/// Write the systolic-array verification set: packed stationary weight rows,
/// the staggered activation stream, and the expected output.
///
/// Uses identity weights over a 1..R^2 activation ramp so the wavefront is
/// easy to eyeball in waveforms.
pub fn write_systolic_vectors(
    output_dir: &Path,
    array_size: usize,
    config: &MacConfig,
) -> Result<PathBuf> {
    let r = array_size;
    let dir = output_dir.join(format!("systolic_{}x{}", r, r));
    fs::create_dir_all(&dir)?;

    let mut weights = Matrix::<Trit>::zeros(r, r);
    for i in 0..r {
        weights.set(i, i, Trit::Positive);
    }
    let activations =
        Matrix::from_vec(r, r, (1..=(r * r) as i64).collect())?;
    let (expected, _) = gemm_ternary(&activations, &weights, config)?;

    let mut f = BufWriter::new(File::create(dir.join("weight_load.mem"))?);
    writeln!(f, "// Weight loading sequence for {}x{} array", r, r)?;
    writeln!(f, "// One row per cycle, weights stationary after load")?;
    for i in 0..r {
        writeln!(f, "{}", codec::pack_weight_row_hex(weights.row(i)))?;
    }

    let mut f = BufWriter::new(File::create(dir.join("activation_stream.mem"))?);
    writeln!(f, "// Activation stream for systolic array")?;
    writeln!(f, "// Staggered input: row i delayed by i cycles")?;
    let cycles = (r - 1) + r + (r - 1);
    for cycle in 0..cycles {
        writeln!(f, "// Cycle {}", cycle)?;
        for row in 0..r {
            let col = cycle as i64 - row as i64;
            let value = if col >= 0 && (col as usize) < r {
                activations.get(row, col as usize)
            } else {
                0
            };
            write!(f, "{} ", codec::encode_hex(value, config.activation_trits)?)?;
        }
        writeln!(f)?;
    }

    let mut f = BufWriter::new(File::create(dir.join("expected.mem"))?);
    writeln!(f, "// Expected output: {}x{} matrix", r, r)?;
    for i in 0..r {
        for j in 0..r {
            writeln!(
                f,
                "{}",
                codec::encode_hex(expected.get(i, j), config.accumulator_trits)?
            )?;
        }
    }

    Ok(dir)
}

/// Matrix sizes (M, K, N) of the standard GEMM vector family
pub const GEMM_SIZES: [(usize, usize, usize); 5] =
    [(2, 2, 2), (4, 4, 4), (8, 8, 8), (4, 8, 4), (8, 16, 8)];

/// Generate the complete vector set for RTL verification
pub fn generate_all(output_dir: &Path) -> Result<()> {
    let config = MacConfig::default();
    fs::create_dir_all(output_dir)?;

    write_mac_vectors(output_dir, &config)?;
    write_pe_vectors(output_dir, &config)?;

    let mut rng = StdRng::seed_from_u64(GEMM_SEED);
    for (m, k, n) in GEMM_SIZES {
        let case = GemmCase::generate(m, k, n, &mut rng, &config)?;
        write_gemm_case(output_dir, &case, &config)?;
    }

    write_systolic_vectors(output_dir, 8, &config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tritone_vectors_{}", name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_mac_vector_file_format() {
        let dir = temp_dir("mac");
        let count = write_mac_vectors(&dir, &MacConfig::default()).unwrap();
        assert_eq!(count, 9 * 5 * 3);

        let text = fs::read_to_string(dir.join("mac_test_vectors.txt")).unwrap();
        let data_lines: Vec<&str> = text.lines().filter(|l| !l.starts_with("//")).collect();
        assert_eq!(data_lines.len(), count);
        for line in &data_lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            assert_eq!(fields.len(), 5);
            // 8-trit activation -> 4 hex, 27-trit accumulators -> 14 hex
            assert_eq!(fields[0].len(), 4);
            assert_eq!(fields[1].len(), 2);
            assert_eq!(fields[2].len(), 14);
            assert_eq!(fields[3].len(), 14);
            assert!(fields[4] == "0" || fields[4] == "1");
        }
    }

    #[test]
    fn test_pe_vectors_follow_mac_trace() {
        let dir = temp_dir("pe");
        write_pe_vectors(&dir, &MacConfig::default()).unwrap();
        let text = fs::read_to_string(dir.join("pe_test_vectors.txt")).unwrap();
        let data_lines: Vec<&str> = text.lines().filter(|l| !l.starts_with("//")).collect();
        assert_eq!(data_lines.len(), 15);
        // weight_load asserted only on the first vector of each stream
        let loads: Vec<&str> = data_lines
            .iter()
            .map(|l| l.split_whitespace().nth(1).unwrap())
            .collect();
        assert_eq!(loads, vec!["1", "0", "0", "0", "0"].repeat(3));
    }

    #[test]
    fn test_gemm_case_sidecar() {
        let dir = temp_dir("gemm");
        let config = MacConfig::default();
        let mut rng = StdRng::seed_from_u64(GEMM_SEED);
        let case = GemmCase::generate(4, 8, 4, &mut rng, &config).unwrap();
        let case_dir = write_gemm_case(&dir, &case, &config).unwrap();

        let sidecar = fs::read_to_string(case_dir.join("config.txt")).unwrap();
        assert!(sidecar.contains("M=4\n"));
        assert!(sidecar.contains("K=8\n"));
        assert!(sidecar.contains("N=4\n"));
        assert!(sidecar.contains(&format!("TOTAL_MACS={}\n", 4 * 8 * 4)));

        let expected = fs::read_to_string(case_dir.join("expected.mem")).unwrap();
        let values: Vec<&str> = expected.lines().filter(|l| !l.starts_with("//")).collect();
        assert_eq!(values.len(), 16);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = MacConfig::default();
        let mut rng_a = StdRng::seed_from_u64(GEMM_SEED);
        let mut rng_b = StdRng::seed_from_u64(GEMM_SEED);
        let a = GemmCase::generate(4, 4, 4, &mut rng_a, &config).unwrap();
        let b = GemmCase::generate(4, 4, 4, &mut rng_b, &config).unwrap();
        assert_eq!(a.activations, b.activations);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.expected, b.expected);
    }

    #[test]
    fn test_systolic_vectors() {
        let dir = temp_dir("systolic");
        let out = write_systolic_vectors(&dir, 4, &MacConfig::default()).unwrap();

        let loads = fs::read_to_string(out.join("weight_load.mem")).unwrap();
        let rows: Vec<&str> = loads.lines().filter(|l| !l.starts_with("//")).collect();
        assert_eq!(rows.len(), 4);
        // 4 weights -> 8 bits -> 2 hex digits per row
        assert!(rows.iter().all(|r| r.len() == 2));

        // Identity weights: expected output equals the activation ramp
        let expected = fs::read_to_string(out.join("expected.mem")).unwrap();
        let first = expected.lines().find(|l| !l.starts_with("//")).unwrap();
        assert_eq!(first, codec::encode_hex(1, 27).unwrap());
    }

    #[test]
    fn test_generate_all() {
        let dir = temp_dir("all");
        generate_all(&dir).unwrap();
        assert!(dir.join("mac_test_vectors.txt").exists());
        assert!(dir.join("pe_test_vectors.txt").exists());
        for (m, k, n) in GEMM_SIZES {
            assert!(dir
                .join(format!("matmul_{}x{}x{}", m, k, n))
                .join("config.txt")
                .exists());
        }
        assert!(dir.join("systolic_8x8").join("expected.mem").exists());
    }
}
