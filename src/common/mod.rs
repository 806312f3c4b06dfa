//! Common functionality.

use std::cmp::Ordering;

use byte_unit::{Byte, UnitType};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use indexmap::IndexMap;

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Helper to print the current memory resident set size via `tracing`.
pub fn trace_rss_now() {
    let rss = procfs::process::Process::myself()
        .and_then(|me| me.stat())
        .map(|stat| stat.rss * procfs::page_size());
    match rss {
        Ok(rss) => tracing::debug!(
            "RSS now: {:.2}",
            Byte::from_u64(rss).get_appropriate_unit(UnitType::Binary)
        ),
        Err(e) => tracing::debug!("could not determine RSS: {}", e),
    }
}

/// Definition of canonical chromosome names.
pub const CHROMS: &[&str] = &[
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "M",
];

/// Build mapping of chromosome names to their rank in `CHROMS`.
pub fn build_chrom_map() -> IndexMap<String, usize> {
    let mut result = IndexMap::new();
    for (i, &chrom_name) in CHROMS.iter().enumerate() {
        result.insert(chrom_name.to_owned(), i);
        result.insert(format!("chr{chrom_name}"), i);
    }
    result.insert("x".to_owned(), 22);
    result.insert("y".to_owned(), 23);
    result.insert("chrx".to_owned(), 22);
    result.insert("chry".to_owned(), 23);
    result.insert("mt".to_owned(), 24);
    result.insert("m".to_owned(), 24);
    result.insert("chrmt".to_owned(), 24);
    result.insert("chrm".to_owned(), 24);
    result.insert("MT".to_owned(), 24);
    result.insert("chrMT".to_owned(), 24);
    result
}

/// Orders `(chromosome, position)` pairs genome-wide.
///
/// Canonical chromosomes come first in karyotype order, all other contigs
/// follow in lexicographic order.
#[derive(Debug, Clone)]
pub struct CoordinateOrder {
    chrom_map: IndexMap<String, usize>,
}

impl Default for CoordinateOrder {
    fn default() -> Self {
        Self {
            chrom_map: build_chrom_map(),
        }
    }
}

impl CoordinateOrder {
    /// Rank of `chrom`; unknown contigs share the rank after `CHROMS`.
    pub fn rank(&self, chrom: &str) -> usize {
        self.chrom_map
            .get(chrom)
            .copied()
            .unwrap_or(CHROMS.len())
    }

    /// Compare two coordinates.
    pub fn compare(&self, lhs: (&str, u64), rhs: (&str, u64)) -> Ordering {
        (self.rank(lhs.0), lhs.0, lhs.1).cmp(&(self.rank(rhs.0), rhs.0, rhs.1))
    }
}
