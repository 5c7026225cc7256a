use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "runner_trigger_lambda";
const LAMBDA_BINARY: &str = "runner_trigger";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the ECS runner trigger workspace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Skip `cargo fmt --check`
        #[arg(long)]
        skip_fmt: bool,
    },
    /// Build the Lambda binary and zip it as `bootstrap`
    ServerlessPackage {
        /// Compilation target triple for the Lambda binary
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for the binary
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Directory that receives the zip artifact
        #[arg(long, default_value = "dist")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(value) => value,
        Err(error) => {
            eprintln!("warning: could not query installed rust targets ({error}); continuing");
            return;
        }
    };

    let installed = String::from_utf8_lossy(&output.stdout);
    if output.status.success() && !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "rust target `{target}` is not installed; run `rustup target add {target}` and retry `cargo run -p xtask -- serverless-package`"
        );
    }
}

fn package_lambda(target: &str, profile: BuildProfile, out_dir: &Path) {
    ensure_rust_target_installed(target);

    step("Build runner trigger lambda");
    let mut cargo_args = vec![
        "build",
        "-p",
        LAMBDA_PACKAGE,
        "--bin",
        LAMBDA_BINARY,
        "--target",
        target,
    ];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Zip bootstrap artifact");
    let binary_path = Path::new("target")
        .join(target)
        .join(profile.dir_name())
        .join(LAMBDA_BINARY);
    fs::create_dir_all(out_dir).expect("failed to create artifact directory");
    let zip_path = out_dir.join(format!("{LAMBDA_BINARY}.zip"));
    write_bootstrap_zip(&binary_path, &zip_path);

    eprintln!("\nPackaged artifact:\n- {}", zip_path.display());
}

// The provided.al2023 runtime executes the archive entry named `bootstrap`.
fn write_bootstrap_zip(binary_path: &Path, zip_path: &Path) {
    let binary = fs::read(binary_path)
        .unwrap_or_else(|error| panic!("failed to read '{}': {error}", binary_path.display()));
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

fn ci(skip_fmt: bool) {
    if !skip_fmt {
        step("Check formatting");
        run_cargo(&["fmt", "--all", "--", "--check"]);
    }

    step("Clippy");
    run_cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]);

    step("Test runner_trigger_core");
    run_cargo(&["test", "-p", "runner_trigger_core"]);

    step("Test runner_trigger_lambda");
    run_cargo(&["test", "-p", LAMBDA_PACKAGE]);

    eprintln!("\nCI passed.");
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    match Cli::parse().command {
        Commands::Ci { skip_fmt } => ci(skip_fmt),
        Commands::ServerlessPackage {
            target,
            profile,
            out_dir,
        } => package_lambda(&target, profile, &out_dir),
    }
}
