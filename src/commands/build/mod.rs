mod aggregate;
mod emit;
mod process;
mod run;
mod source;

pub use process::process_record;
pub use run::run;
