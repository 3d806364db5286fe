mod types;
mod error;
mod iupac;
mod fasta;
mod gff;
mod inputs;
mod scanner;
mod annotation;
mod matcher;
mod amplicon;
mod filter;
mod primer;
mod output;
mod genotype;
mod pipeline;

pub use types::*;
pub use error::*;
pub use iupac::*;
pub use fasta::*;
pub use gff::*;
pub use inputs::*;
pub use scanner::*;
pub use annotation::*;
pub use matcher::*;
pub use amplicon::*;
pub use filter::*;
pub use primer::*;
pub use output::*;
pub use genotype::*;
pub use pipeline::*;
