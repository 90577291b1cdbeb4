use anyhow::Result;
use colored::Colorize;
use std::time::Instant;

use crate::step::Step;

pub fn run(unit_only: bool, integration_only: bool, proptest_cases: Option<u32>) -> Result<()> {
    println!();
    println!("{}", "🧪 Running tests...".cyan().bold());
    println!();

    let total_start = Instant::now();
    let cases = proptest_cases.map(|n| n.to_string());

    let with_cases = |step: Step<'static>| match &cases {
        Some(n) => step.env("PROPTEST_CASES", n.clone()),
        None => step,
    };

    if !integration_only {
        with_cases(Step::new("Unit tests", &["test", "--lib", "--workspace"])).run()?;
    }

    if !unit_only {
        with_cases(Step::new(
            "Integration tests",
            &["test", "--tests", "--workspace"],
        ))
        .run()?;
    }

    Step::new("Doc tests", &["test", "--doc", "--workspace"])
        .warn_only()
        .run()?;

    println!(
        "{}",
        format!(
            "✓ All tests completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
