use std::env;
use std::path::PathBuf;
use std::process;

use ruledoc_core::FatalError;
use ruledoc_sync::context::ContextStrategy;
use ruledoc_sync::engine::LlmGenerator;
use ruledoc_sync::Outcome;

fn usage() -> ! {
    eprintln!("Usage: ruledoc [root] [--span-context]");
    process::exit(1);
}

fn fail(err: FatalError) -> ! {
    eprintln!("Error: {err}");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    let mut root = PathBuf::from(".");
    let mut strategy = ContextStrategy::WholeFile;
    let mut saw_root = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--span-context" => strategy = ContextStrategy::RuleSpan,
            flag if flag.starts_with('-') => usage(),
            path => {
                if saw_root {
                    usage();
                }
                root = PathBuf::from(path);
                saw_root = true;
            }
        }
    }

    let settings = ruledoc_core::load_settings();
    if let Err(e) = ruledoc_core::validate_settings(&settings) {
        fail(e);
    }

    let generator = LlmGenerator::new(&settings);

    match ruledoc_sync::run_sync(&root, &settings, strategy, &generator).await {
        Ok(summary) => {
            println!(
                "{} updated, {} unchanged, {} skipped",
                summary.count(Outcome::Updated),
                summary.count(Outcome::Unchanged),
                summary.count(Outcome::Skipped)
            );
        }
        Err(e) => fail(e),
    }
}
