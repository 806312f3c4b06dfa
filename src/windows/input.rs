//! Code for reading the genotype count table.

use std::io::Read;
use std::path::Path;

use crate::err::ArgError;

/// Delimiter of the input table.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
pub enum Delimiter {
    /// Tab-separated, as written by `plink2 --hardy`.
    #[default]
    #[strum(serialize = "tab")]
    Tab,
    /// Comma-separated.
    #[strum(serialize = "comma")]
    Comma,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

/// Variant identifier of the form `chrom:pos:ref:alt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantId {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternative: String,
}

impl std::str::FromStr for VariantId {
    type Err = ArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(':').collect::<Vec<_>>();
        match fields.as_slice() {
            [chrom, pos, reference, alternative]
                if !chrom.is_empty() && !reference.is_empty() && !alternative.is_empty() =>
            {
                Ok(Self {
                    chrom: chrom.to_string(),
                    pos: pos.parse()?,
                    reference: reference.to_string(),
                    alternative: alternative.to_string(),
                })
            }
            _ => Err(ArgError::VariantIdInvalidFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.chrom, self.pos, self.reference, self.alternative
        )
    }
}

/// Number of carriers given the genotype class counts.
///
/// The rarer homozygous class is counted as the alternative one so that
/// swapped allele coding does not inflate the count.
pub fn count_carriers(hom_a1: u32, het_a1: u32, two_ax: u32) -> u32 {
    hom_a1.min(two_ax) * 2 + het_a1
}

/// One variant with its carrier count, the unit that gets windowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    /// identifier, written as `SNP` column
    pub id: String,
    /// chromosome name
    pub chromosome: String,
    /// 1-based position
    pub position: u64,
    /// number of carriers
    pub carriers: u32,
    /// gene annotation, empty if missing
    pub gene: String,
}

impl VariantRecord {
    /// Construct from identifier, genotype counts and gene.
    pub fn from_counts(
        id: &str,
        hom_a1: u32,
        het_a1: u32,
        two_ax: u32,
        gene: &str,
    ) -> Result<Self, ArgError> {
        let variant_id: VariantId = id.parse()?;
        Ok(Self {
            id: id.to_string(),
            chromosome: variant_id.chrom,
            position: variant_id.pos,
            carriers: count_carriers(hom_a1, het_a1, two_ax),
            gene: normalize_gene(gene),
        })
    }
}

/// Map missing-value markers to the empty string.
fn normalize_gene(gene: &str) -> String {
    match gene.trim() {
        "." | "NA" | "nan" => String::new(),
        gene => gene.to_string(),
    }
}

/// Column indices of the fields we need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    id: usize,
    hom_a1: usize,
    het_a1: usize,
    two_ax: usize,
    gene: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord, gene_column: &str) -> Result<Self, anyhow::Error> {
        let names = headers
            .iter()
            .map(|name| name.trim_start_matches('#'))
            .collect::<Vec<_>>();
        let find = |column: &str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or_else(|| anyhow::anyhow!("missing column {:?} in header {:?}", column, names))
        };
        Ok(Self {
            id: find("ID")?,
            hom_a1: find("HOM_A1_CT")?,
            het_a1: find("HET_A1_CT")?,
            two_ax: find("TWO_AX_CT")?,
            gene: find(gene_column)?,
        })
    }
}

/// Read all records from `reader`.
pub fn read_records<R: Read>(
    reader: R,
    delimiter: Delimiter,
    gene_column: &str,
) -> Result<Vec<VariantRecord>, anyhow::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?, gene_column)?;

    let mut result = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let lineno = i + 2;
        let record = record.map_err(|e| anyhow::anyhow!("problem reading line {}: {}", lineno, e))?;
        let field = |idx: usize| {
            record
                .get(idx)
                .ok_or_else(|| anyhow::anyhow!("line {} has no column {}", lineno, idx + 1))
        };
        let count = |idx: usize| -> Result<u32, anyhow::Error> {
            let value = field(idx)?;
            value
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid count {:?} in line {}: {}", value, lineno, e))
        };

        let variant = VariantRecord::from_counts(
            field(columns.id)?,
            count(columns.hom_a1)?,
            count(columns.het_a1)?,
            count(columns.two_ax)?,
            field(columns.gene)?,
        )
        .map_err(|e| anyhow::anyhow!("problem in line {}: {}", lineno, e))?;
        result.push(variant);
    }

    Ok(result)
}

/// Load all records from the (possibly gzipped) file at `path`.
pub fn load_records<P: AsRef<Path>>(
    path: P,
    delimiter: Delimiter,
    gene_column: &str,
) -> Result<Vec<VariantRecord>, anyhow::Error> {
    let reader = crate::common::io::open_read_maybe_gz(&path).map_err(|e| {
        anyhow::anyhow!("could not open {:?} for reading: {}", path.as_ref(), e)
    })?;
    read_records(reader, delimiter, gene_column)
}
