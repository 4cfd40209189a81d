use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking all crates...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: Hardware target
    println!("{}", "  Checking hardware target (STM32H7)...".cyan());
    let hw_start = Instant::now();

    let hw_output = Command::new("cargo")
        .args([
            "check",
            "-p",
            "firmware",
            "--target",
            "thumbv7em-none-eabihf",
            "--features",
            "hardware",
        ])
        .output()
        .context("Failed to check hardware build")?;

    if !hw_output.status.success() {
        eprintln!("{}", "  ✗ Hardware check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&hw_output.stderr));
        anyhow::bail!("Hardware check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ Hardware check passed in {:.2}s",
            hw_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 2: i2s crate (host, default features)
    println!("{}", "  Checking i2s crate (host)...".cyan());
    let i2s_start = Instant::now();

    let i2s_output = Command::new("cargo")
        .args(["check", "-p", "i2s"])
        .output()
        .context("Failed to check i2s crate")?;

    if !i2s_output.status.success() {
        eprintln!("{}", "  ✗ i2s check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&i2s_output.stderr));
        anyhow::bail!("i2s check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ i2s check passed in {:.2}s",
            i2s_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 3: Platform crate (no_std compatibility)
    println!("{}", "  Checking platform crate (no_std)...".cyan());
    let platform_start = Instant::now();

    let platform_output = Command::new("cargo")
        .args([
            "check",
            "-p",
            "platform",
            "--target",
            "thumbv7em-none-eabihf",
            "--no-default-features",
        ])
        .output()
        .context("Failed to check platform crate")?;

    if !platform_output.status.success() {
        eprintln!("{}", "  ✗ Platform check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&platform_output.stderr));
        anyhow::bail!("Platform check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ Platform check passed in {:.2}s",
            platform_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 4: Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args([
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ])
        .output()
        .context("Failed to run clippy")?;

    if !clippy_output.status.success() {
        eprintln!("{}", "  ✗ Clippy warnings found".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        anyhow::bail!("Clippy check failed");
    } else {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    }
    println!();

    // Check 5: Format check
    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if !fmt_output.status.success() {
        eprintln!("{}", "  ✗ Formatting issues found".red().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
        anyhow::bail!("Format check failed");
    } else {
        println!("{}", "  ✓ Formatting check passed".green());
    }
    println!();

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
