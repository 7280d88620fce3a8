//! Handoff CLI
//!
//! Satu Producer (0..9), satu Consumer, buffer kapasitas 5. Tanpa argumen.
//!
//! Usage:
//!   cargo run --release
//!
//! Diagnostik (stderr): RUST_LOG=handoff=debug cargo run

use handoff::{signal, CancelToken, HandoffConfig, Orchestrator};

/// Exit code konvensional untuk proses yang dihentikan SIGINT
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    // Stdout untuk output buffer, tracing ke stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handoff=warn".into()),
        )
        .init();

    let shutdown = CancelToken::new();
    if let Err(e) = signal::cancel_on_interrupt(shutdown.clone()) {
        // Tetap jalan, hanya tanpa Ctrl-C handling
        tracing::warn!(error = %e, "running without interrupt handler");
    }

    let orchestrator = Orchestrator::new(HandoffConfig::default());

    match orchestrator.run(&shutdown) {
        Ok(_) => {}
        Err(e) if e.is_interrupted() => {
            // Role tidak dibunuh: minta berhenti, tunggu, baru exit
            if let Err(e) = orchestrator.shutdown() {
                eprintln!("❌ Handoff error: {}", e);
            }
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => {
            eprintln!("❌ Handoff error: {}", e);
            std::process::exit(1);
        }
    }
}
