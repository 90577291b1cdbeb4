use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::Step;

pub fn run(target: &str) -> Result<()> {
    println!();
    println!("{}", "🔍 Checking multi-lane SPI crates...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Both library crates must stay no_std + alloc for firmware targets.
    Step::new(
        "platform (no_std)",
        &["check", "-p", "platform", "--target", target, "--no-default-features"],
    )
    .run()?;
    Step::new(
        "multilane (no_std)",
        &["check", "-p", "multilane", "--target", target, "--no-default-features"],
    )
    .run()?;
    Step::new(
        "multilane (no_std + defmt)",
        &["check", "-p", "multilane", "--target", target, "--features", "defmt"],
    )
    .run()?;
    Step::new(
        "multilane (host, std + tracing)",
        &["check", "-p", "multilane", "--features", "std,tracing"],
    )
    .run()?;

    Step::new(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
    .warn_only()
    .run()?;
    Step::new("Formatting", &["fmt", "--all", "--check"])
        .warn_only()
        .run()?;

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
