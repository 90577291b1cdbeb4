use anyhow::{Context, Result};
use colored::Colorize;
use std::process::{Command, Output};
use std::time::Instant;

/// What a failing step does to the overall run.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum OnFailure {
    Abort,
    Warn,
}

/// One `cargo` invocation with a progress line.
pub struct Step<'a> {
    pub label: &'a str,
    pub args: Vec<&'a str>,
    pub env: Vec<(&'a str, String)>,
    pub on_failure: OnFailure,
}

impl<'a> Step<'a> {
    pub fn new(label: &'a str, args: &[&'a str]) -> Self {
        Self {
            label,
            args: args.to_vec(),
            env: Vec::new(),
            on_failure: OnFailure::Abort,
        }
    }

    pub fn warn_only(mut self) -> Self {
        self.on_failure = OnFailure::Warn;
        self
    }

    pub fn env(mut self, key: &'a str, value: String) -> Self {
        self.env.push((key, value));
        self
    }

    /// Run the step; returns captured output on success (or on a tolerated failure).
    pub fn run(&self) -> Result<Output> {
        println!("{}", format!("  {}...", self.label).cyan());
        let start = Instant::now();

        let output = Command::new("cargo")
            .args(&self.args)
            .envs(self.env.iter().map(|(k, v)| (*k, v.as_str())))
            .output()
            .with_context(|| format!("Failed to run cargo {}", self.args.join(" ")))?;

        if output.status.success() {
            println!(
                "{}",
                format!(
                    "  ✓ {} passed {}in {:.2}s",
                    self.label,
                    summary_suffix(&String::from_utf8_lossy(&output.stdout)),
                    start.elapsed().as_secs_f64()
                )
                .green()
            );
        } else if self.on_failure == OnFailure::Warn {
            eprintln!("{}", format!("  ⚠ {} reported problems", self.label).yellow().bold());
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
        } else {
            eprintln!("{}", format!("  ✗ {} failed", self.label).red().bold());
            eprintln!();
            eprintln!("{}", String::from_utf8_lossy(&output.stdout));
            eprintln!("{}", String::from_utf8_lossy(&output.stderr));
            anyhow::bail!("{} failed", self.label);
        }
        println!();
        Ok(output)
    }
}

/// "(N passed; ...) " from libtest output, or nothing for non-test commands.
fn summary_suffix(stdout: &str) -> String {
    let passed: usize = stdout
        .lines()
        .filter_map(|line| line.split("test result: ok.").nth(1))
        .filter_map(|rest| rest.split_whitespace().next()?.parse::<usize>().ok())
        .sum();
    if stdout.contains("test result:") {
        format!("({passed} tests) ")
    } else {
        String::new()
    }
}
