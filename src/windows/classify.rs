//! Classification of variants into solo-variant, solo-site and accumulation buckets.

use indexmap::IndexMap;

use super::input::VariantRecord;

/// The bucket a variant falls into for a given carrier cutoff.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
)]
pub enum Bucket {
    /// The variant alone reaches the cutoff.
    #[strum(serialize = "solo-variant")]
    SoloVariant,
    /// The sub-cutoff variants at the variant's site reach the cutoff together.
    #[strum(serialize = "solo-site")]
    SoloSite,
    /// Neither, windows must be built across sites.
    #[strum(serialize = "accumulation")]
    Accumulation,
}

/// A variant together with its bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedVariant {
    pub variant: VariantRecord,
    pub bucket: Bucket,
}

/// Sum of carriers of all sub-cutoff variants, keyed by `(chromosome, position)`.
fn site_totals(variants: &[VariantRecord], ncutoff: u32) -> IndexMap<(&str, u64), u64> {
    let mut result = IndexMap::new();
    for variant in variants.iter().filter(|v| v.carriers < ncutoff) {
        *result
            .entry((variant.chromosome.as_str(), variant.position))
            .or_insert(0u64) += u64::from(variant.carriers);
    }
    result
}

/// Assign each of `variants` to its bucket.
///
/// This must be called on the whole data set, before restricting to a gene,
/// as the site totals include the variants of overlapping genes.  Variants
/// that reach the cutoff on their own do not count towards the site total.
pub fn classify(variants: Vec<VariantRecord>, ncutoff: u32) -> Vec<TaggedVariant> {
    let buckets = {
        let totals = site_totals(&variants, ncutoff);
        variants
            .iter()
            .map(|variant| {
                if variant.carriers >= ncutoff {
                    Bucket::SoloVariant
                } else if totals
                    .get(&(variant.chromosome.as_str(), variant.position))
                    .copied()
                    .unwrap_or_default()
                    >= u64::from(ncutoff)
                {
                    Bucket::SoloSite
                } else {
                    Bucket::Accumulation
                }
            })
            .collect::<Vec<_>>()
    };

    variants
        .into_iter()
        .zip(buckets)
        .map(|(variant, bucket)| TaggedVariant { variant, bucket })
        .collect()
}
