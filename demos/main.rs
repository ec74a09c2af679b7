//! Benchmark runner: naive scalar vs. the blocked/packed/SIMD GEMM core,
//! single- and multi-threaded, across all five supported dtypes.

mod error;

use error::DemoError;
use gemm_core::kernel::Arith;
use gemm_core::{cache, isa};
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt::init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), DemoError> {
    let dtype = parse_dtype_arg()?;
    let nthreads = cache::get_core_num();

    println!("=== GEMM Benchmark ===\n");
    println!("ISA tier: {:?}", isa::detect());
    println!("Threads:  {nthreads}\n");

    let sizes = parse_size_arg()?.unwrap_or_else(|| vec![256, 512, 1024]);
    let iterations = 3;

    match dtype {
        "f32" => bench_dtype::<f32>(
            &sizes,
            iterations,
            nthreads,
            gemm_core::gemm_f32,
            gemm_core::gemm_f32_parallel,
        ),
        "f64" => bench_dtype::<f64>(
            &sizes,
            iterations,
            nthreads,
            gemm_core::gemm_f64,
            gemm_core::gemm_f64_parallel,
        ),
        "i32" => bench_dtype::<i32>(
            &sizes,
            iterations,
            nthreads,
            gemm_core::gemm_i32,
            gemm_core::gemm_i32_parallel,
        ),
        "i16" => bench_dtype::<i16>(
            &sizes,
            iterations,
            nthreads,
            gemm_core::gemm_i16,
            gemm_core::gemm_i16_parallel,
        ),
        "i8" => bench_dtype::<i8>(
            &sizes,
            iterations,
            nthreads,
            gemm_core::gemm_i8,
            gemm_core::gemm_i8_parallel,
        ),
        other => return Err(DemoError::UnknownDType(other.to_string())),
    }

    Ok(())
}

fn parse_dtype_arg() -> Result<&'static str, DemoError> {
    let requested = std::env::args().nth(1).unwrap_or_else(|| "f64".to_string());
    match requested.as_str() {
        "f32" => Ok("f32"),
        "f64" => Ok("f64"),
        "i32" => Ok("i32"),
        "i16" => Ok("i16"),
        "i8" => Ok("i8"),
        other => Err(DemoError::UnknownDType(other.to_string())),
    }
}

/// Optional second argv: a single `M=N=K` matrix size overriding the
/// default `[256, 512, 1024]` sweep. `Ok(None)` when no override was given.
fn parse_size_arg() -> Result<Option<Vec<usize>>, DemoError> {
    let Some(raw) = std::env::args().nth(2) else {
        return Ok(None);
    };
    let size: usize = raw.parse().map_err(|e| DemoError::InvalidSize(raw.clone(), e))?;
    if size == 0 {
        return Err(DemoError::ZeroSize);
    }
    Ok(Some(vec![size]))
}

#[allow(clippy::too_many_arguments)]
fn bench_dtype<T>(
    sizes: &[usize],
    iterations: usize,
    nthreads: usize,
    single: fn(&[T], &[T], &mut [T], usize, usize, usize),
    parallel: fn(&[T], &[T], &mut [T], usize, usize, usize, usize),
) where
    T: Sample + Send + Sync + 'static,
{
    for &size in sizes {
        println!("Matrix: {size}×{size}");
        println!("{}", "-".repeat(50));

        let (m, n, k) = (size, size, size);
        let a: Vec<T> = (0..m * k).map(T::sample).collect();
        let b: Vec<T> = (0..k * n).map(|i| T::sample(i + 1)).collect();

        let results = [
            ("naive", bench_fn(&a, &b, m, n, k, iterations, gemm_core::reference::gemm_naive)),
            ("blocked", bench_fn(&a, &b, m, n, k, iterations, single)),
            (
                "blocked MT",
                bench_fn(&a, &b, m, n, k, iterations, |a, b, c, m, n, k| {
                    parallel(a, b, c, m, n, k, nthreads)
                }),
            ),
        ];

        let baseline = results[0].1 .0;
        for (i, (name, (time_ms, gflops))) in results.iter().enumerate() {
            println!(
                "{}. {:12} {:8.2} ms  {:6.2} GFLOPS  ({:.1}x)",
                i + 1,
                name,
                time_ms,
                gflops,
                baseline / time_ms
            );
        }
        println!();
    }
}

/// Small deterministic sample values in `[-8, 7]`, kept narrow so the
/// narrower integer dtypes accumulate over `k=1024` without wrapping on
/// every single test run (wrapping itself is still exercised directly in
/// each driver's own unit tests).
trait Sample: Arith {
    fn sample(i: usize) -> Self;
}

impl Sample for f32 {
    fn sample(i: usize) -> Self {
        (i % 16) as f32 - 8.0
    }
}

impl Sample for f64 {
    fn sample(i: usize) -> Self {
        (i % 16) as f64 - 8.0
    }
}

impl Sample for i32 {
    fn sample(i: usize) -> Self {
        (i % 16) as i32 - 8
    }
}

impl Sample for i16 {
    fn sample(i: usize) -> Self {
        (i % 16) as i16 - 8
    }
}

impl Sample for i8 {
    fn sample(i: usize) -> Self {
        (i % 16) as i8 - 8
    }
}

/// Benchmark a `C += A·B` function: one untimed warmup call, then
/// `iterations` timed calls into a fresh `C` each time.
fn bench_fn<T, F>(a: &[T], b: &[T], m: usize, n: usize, k: usize, iterations: usize, f: F) -> (f64, f64)
where
    T: Arith,
    F: Fn(&[T], &[T], &mut [T], usize, usize, usize),
{
    let mut warmup = vec![T::default(); m * n];
    f(a, b, &mut warmup, m, k, n);

    let mut total = 0.0;
    for _ in 0..iterations {
        let mut c = vec![T::default(); m * n];
        let start = Instant::now();
        f(a, b, &mut c, m, k, n);
        total += start.elapsed().as_secs_f64();
    }

    let avg = total / iterations as f64;
    let gflops = 2.0 * (m * n * k) as f64 / avg / 1e9;
    (avg * 1000.0, gflops)
}
