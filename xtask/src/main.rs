use std::process::Command;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cubeview")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests, shader reflection and docs, in that order
    Check,
    /// cargo fmt --check on all crates
    Fmt,
    /// clippy with warnings denied
    Clippy,
    /// All workspace tests
    Test,
    /// Tests of the crates that never touch a GPU
    Headless,
    /// Reflect the bundled WGSL shaders through the CLI
    Shaders,
    /// rustdoc for the workspace
    Doc,
}

/// One cargo invocation and what to call it in the log.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "fmt",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "test",
    args: &["test", "--workspace"],
};
const HEADLESS: Step = Step {
    name: "headless tests",
    args: &[
        "test",
        "-p",
        "cubeview-common",
        "-p",
        "cubeview-kernel",
        "-p",
        "cubeview-input",
        "-p",
        "cubeview-assets",
        "-p",
        "cubeview-render",
        "-p",
        "cubeview-cli",
    ],
};
const SHADERS: Step = Step {
    name: "shader reflection",
    args: &["run", "-q", "-p", "cubeview-cli", "--", "shaders"],
};
const DOC: Step = Step {
    name: "doc",
    args: &["doc", "--workspace", "--no-deps"],
};

fn run(step: &Step) -> Result<()> {
    println!("==> {} (cargo {})", step.name, step.args.join(" "));
    let status = Command::new("cargo").args(step.args).status()?;
    if !status.success() {
        bail!("{} failed with {status}", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let steps: &[&Step] = match cli.command {
        Commands::Check => &[&FMT, &CLIPPY, &TEST, &SHADERS, &DOC],
        Commands::Fmt => &[&FMT],
        Commands::Clippy => &[&CLIPPY],
        Commands::Test => &[&TEST],
        Commands::Headless => &[&HEADLESS],
        Commands::Shaders => &[&SHADERS],
        Commands::Doc => &[&DOC],
    };
    for step in steps {
        run(step)?;
    }
    Ok(())
}
