use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "eco-crosswalk",
    version,
    about = "Chess opening alias to canonical family crosswalk tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Build(BuildArgs),
    Classify(ClassifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    #[arg(long, default_value = "split/SplitChessECO - *.csv")]
    pub input_glob: String,

    #[arg(long, default_value = "outputs")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub no_manifest: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub eco: String,

    #[arg(long)]
    pub family_hint: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
