use anyhow::Result;
use colored::Colorize;

use crate::step::Step;

/// Host feature set: mocks, `std::error::Error` impls and tracing call sites.
const DOC_FEATURES: &str = "platform/std,multilane/std,multilane/tracing";

/// Rustdoc arguments for the two library crates.
fn doc_args(open: bool) -> Vec<&'static str> {
    let mut args = vec![
        "doc",
        "-p",
        "platform",
        "-p",
        "multilane",
        "--no-deps",
        "--features",
        DOC_FEATURES,
    ];
    if open {
        args.push("--open");
    }
    args
}

pub fn run(open: bool) -> Result<()> {
    println!();
    println!("{}", "📚 Documenting platform + multilane...".cyan().bold());
    println!();

    Step::new("Rustdoc", &doc_args(open)).run()?;

    if !open {
        println!("   {}", "target/doc/multilane/index.html".dimmed());
        println!("   {}", "target/doc/platform/index.html".dimmed());
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_both_library_crates_with_host_features() {
        let args = doc_args(false);
        assert_eq!(&args[..5], &["doc", "-p", "platform", "-p", "multilane"]);
        assert!(args.contains(&DOC_FEATURES));
        assert!(!args.contains(&"--open"));
    }

    #[test]
    fn open_flag_is_forwarded() {
        assert_eq!(doc_args(true).last(), Some(&"--open"));
    }
}
