//! Implementation of `windows build` subcommand.

use std::time::Instant;

use strum::IntoEnumIterator;
use thousands::Separable;

use crate::common::{self, CoordinateOrder};

use super::builder::{build_windows, summarize};
use super::classify::{classify, Bucket, TaggedVariant};
use super::input::{load_records, Delimiter};
use super::output::write_file;

/// Command line arguments for `windows build` subcommand.
#[derive(Debug, clap::Parser)]
#[command(author, version, about = "assign the variants of a gene to carrier windows", long_about = None)]
pub struct Args {
    /// Path to the genotype count table, e.g., from `plink2 --hardy`.
    #[arg(long)]
    pub path_input: String,
    /// Path to the output TSV file, gzipped if ending in `.gz`.
    #[arg(long)]
    pub path_output: String,
    /// Gene to build the windows for.
    #[arg(long)]
    pub gene: String,
    /// Minimal number of carriers per window.
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub ncutoff: u32,
    /// Name of the column with the gene annotation.
    #[arg(long, default_value = "MANECT_gene")]
    pub gene_column: String,
    /// Delimiter of the input table.
    #[arg(long, value_enum, default_value_t = Delimiter::Tab)]
    pub input_delimiter: Delimiter,
}

/// Restrict `tagged` to `gene` and sort by coordinate.
///
/// The sort is stable so that the variants of each bucket stay sorted.
fn select_gene(tagged: Vec<TaggedVariant>, gene: &str) -> Vec<TaggedVariant> {
    let order = CoordinateOrder::default();
    let mut result = tagged
        .into_iter()
        .filter(|tagged| tagged.variant.gene == gene)
        .collect::<Vec<_>>();
    result.sort_by(|lhs, rhs| {
        order.compare(
            (lhs.variant.chromosome.as_str(), lhs.variant.position),
            (rhs.variant.chromosome.as_str(), rhs.variant.position),
        )
    });
    result
}

/// Main entry point for `windows build` sub command.
pub fn run(args_common: &common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:?}", &args_common);
    tracing::info!("args = {:?}", &args);
    if args.ncutoff == 0 {
        anyhow::bail!("--ncutoff must be positive");
    }

    tracing::info!("loading genotype counts from {}...", &args.path_input);
    let variants = load_records(&args.path_input, args.input_delimiter, &args.gene_column)?;
    tracing::info!(
        "... loaded {} variants in {:?}",
        variants.len().separate_with_commas(),
        before_anything.elapsed()
    );
    common::trace_rss_now();

    tracing::info!("classifying variants with cutoff of {} carriers...", args.ncutoff);
    let tagged = classify(variants, args.ncutoff);
    for bucket in Bucket::iter() {
        tracing::info!(
            "  {} variants: {}",
            bucket,
            tagged
                .iter()
                .filter(|t| t.bucket == bucket)
                .count()
                .separate_with_commas()
        );
    }

    let tagged = select_gene(tagged, &args.gene);
    if tagged.is_empty() {
        tracing::warn!("no variants found for gene {}", &args.gene);
    } else {
        tracing::info!(
            "{} variants annotated with gene {}",
            tagged.len().separate_with_commas(),
            &args.gene
        );
    }

    let records = build_windows(&tagged, args.ncutoff, &args.gene)
        .map_err(|e| anyhow::anyhow!("could not build windows for {}: {}", &args.gene, e))?;
    let summaries = summarize(&records);
    for summary in &summaries {
        let kind = if summary.solo_variant_window {
            Bucket::SoloVariant
        } else if summary.solo_site_window {
            Bucket::SoloSite
        } else {
            Bucket::Accumulation
        };
        tracing::debug!(
            "{} ({}): {} variant(s), {} carriers",
            &summary.window_id,
            kind,
            summary.variants,
            summary.carriers
        );
    }
    let below_cutoff = summaries
        .iter()
        .filter(|s| s.carriers < u64::from(args.ncutoff))
        .count();
    if below_cutoff > 0 {
        tracing::warn!(
            "{} window(s) of {} have fewer than {} carriers",
            below_cutoff,
            &args.gene,
            args.ncutoff
        );
    }
    tracing::info!("built {} windows", summaries.len().separate_with_commas());

    tracing::info!("writing windows to {}...", &args.path_output);
    write_file(&args.path_output, &records)?;

    tracing::info!(
        "All of `windows build` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(tmp_dir: &temp_testdir::TempDir, gene: &str, path_output: &str) -> Args {
        Args {
            path_input: "tests/data/windows/example_gene_counts.tsv".into(),
            path_output: tmp_dir.join(path_output).to_string_lossy().to_string(),
            gene: gene.into(),
            ncutoff: 20,
            gene_column: "MANECT_gene".into(),
            input_delimiter: Delimiter::Tab,
        }
    }

    #[test]
    fn run_example_gene() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(&tmp_dir, "exampleGene", "out.tsv");

        run(&common::Args::default(), &args)?;

        let actual = std::fs::read_to_string(&args.path_output)?;
        let expected =
            std::fs::read_to_string("tests/data/windows/exampleGene_windows.tsv")?;
        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn run_gzip_output() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(&tmp_dir, "exampleGene", "out.tsv.gz");

        run(&common::Args::default(), &args)?;

        let mut actual = String::new();
        std::io::Read::read_to_string(
            &mut common::io::open_read_maybe_gz(&args.path_output)?,
            &mut actual,
        )?;
        let expected =
            std::fs::read_to_string("tests/data/windows/exampleGene_windows.tsv")?;
        assert_eq!(actual, expected);

        Ok(())
    }

    #[test]
    fn run_unknown_gene() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = args(&tmp_dir, "noSuchGene", "out.tsv");

        run(&common::Args::default(), &args)?;

        assert_eq!(
            std::fs::read_to_string(&args.path_output)?,
            "SNP\tWindow\tcarriers\tsolo_variant_window\tpos\tsolo_site_window\tcarriers_in_window\n"
        );

        Ok(())
    }

    #[test]
    fn select_gene_sorts_by_coordinate() {
        let tagged = ["chr2:5", "chr1:300", "chr10:1", "chr1:20"]
            .iter()
            .map(|site| {
                let (chrom, pos) = site.split_once(':').unwrap_or_default();
                TaggedVariant {
                    variant: crate::windows::input::VariantRecord {
                        id: format!("{}:A:G", site),
                        chromosome: chrom.into(),
                        position: pos.parse().unwrap_or_default(),
                        carriers: 1,
                        gene: "G".into(),
                    },
                    bucket: Bucket::Accumulation,
                }
            })
            .collect::<Vec<_>>();

        let selected = select_gene(tagged, "G");

        assert_eq!(
            selected
                .iter()
                .map(|t| t.variant.id.as_str())
                .collect::<Vec<_>>(),
            vec!["chr1:20:A:G", "chr1:300:A:G", "chr2:5:A:G", "chr10:1:A:G"]
        );
    }
}
