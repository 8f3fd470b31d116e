//! gpu-usage: Intel GPU engine utilization monitor
//!
//! Continuously samples per-engine busy percentages (or takes a single
//! snapshot with `-s`) and prints one normalized line per sample to
//! stdout. Sampling runs against the simulated provider topology; a build
//! bound to the vendor metrics-discovery library substitutes its own
//! `MetricsProvider` implementation here.

use std::io::{self, Write};
use std::process;
use std::sync::atomic::AtomicBool;

use intel_gpu_usage::sim::SimProvider;
use intel_gpu_usage::{CancelFlag, Monitor, RunMode};

/// Flag the signal handler sets; the monitor polls it between waits
static CANCEL_REQUESTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_signal(_sig: libc::c_int) {
    use std::sync::atomic::Ordering;
    CANCEL_REQUESTED.store(true, Ordering::SeqCst);
}

#[cfg(unix)]
fn install_signal_handlers() {
    // Plain flag store in the handler, observed at the monitor's poll
    // points; no work happens in signal context.
    unsafe {
        libc::signal(libc::SIGINT, on_signal as libc::sighandler_t);
        libc::signal(libc::SIGTERM, on_signal as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}

fn print_usage(out: &mut dyn io::Write, program: &str) {
    let _ = writeln!(out, "GPU Usage Monitor - Intel Metrics Discovery");
    let _ = writeln!(out);
    let _ = writeln!(out, "Usage:");
    let _ = writeln!(
        out,
        "  {program}              # Continuous monitoring (updates every 1 second)"
    );
    let _ = writeln!(out, "  {program} -s           # Single snapshot");
    let _ = writeln!(out, "  {program} --snapshot   # Single snapshot");
    let _ = writeln!(out, "  {program} -h           # Show this help");
    let _ = writeln!(out, "  {program} --help       # Show this help");
    let _ = writeln!(out);
    let _ = writeln!(out, "Output format:");
    let _ = writeln!(
        out,
        "  Render: 23.5%  Blitter: 0.0%  Video: 12.3%  Enhance: 0.0%  | Total: 35.8%"
    );
}

fn run() -> i32 {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "gpu-usage".to_string());

    let mut mode = RunMode::continuous_default();
    for arg in args {
        match arg.as_str() {
            "-s" | "--snapshot" => mode = RunMode::Snapshot,
            "-h" | "--help" => {
                print_usage(&mut io::stdout(), &program);
                return 0;
            }
            other => {
                eprintln!("Unknown argument: {other}");
                eprintln!();
                print_usage(&mut io::stderr(), &program);
                return 1;
            }
        }
    }

    install_signal_handlers();

    eprintln!("Intel GPU Usage Monitor");
    eprintln!("======================");

    let provider = SimProvider::uhd620();
    let monitor = Monitor::new(&provider, mode)
        .with_cancel_flag(CancelFlag::from_static(&CANCEL_REQUESTED));

    match mode {
        RunMode::Snapshot => eprintln!("Mode: Single snapshot"),
        RunMode::Continuous { .. } => eprintln!("Mode: Continuous (press Ctrl+C to stop)"),
    }

    let mut stdout = io::stdout().lock();
    match monitor.run(&mut stdout) {
        Ok(()) => {
            eprintln!("GPU monitoring completed");
            0
        }
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    }
}

fn main() {
    process::exit(run());
}
