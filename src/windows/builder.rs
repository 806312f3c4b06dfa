//! Assignment of the variants of one gene to carrier windows.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::common::CoordinateOrder;
use crate::err::WindowError;

use super::classify::{Bucket, TaggedVariant};
use super::input::VariantRecord;
use super::output::WindowRecord;

/// Hands out window numbers and formats window names.
#[derive(Debug, Clone)]
struct WindowCounter {
    gene: String,
    ncutoff: u32,
    current: usize,
}

impl WindowCounter {
    fn new(gene: &str, ncutoff: u32) -> Self {
        Self {
            gene: gene.to_string(),
            ncutoff,
            current: 0,
        }
    }

    fn name(&self, offset: usize) -> String {
        format!(
            "{}_{}_Window__{}",
            self.gene,
            self.ncutoff,
            self.current + offset
        )
    }

    fn advance(&mut self, count: usize) {
        self.current += count;
    }
}

/// Whether `lhs` and `rhs` are located at the same site.
fn same_site(lhs: &VariantRecord, rhs: &VariantRecord) -> bool {
    lhs.position == rhs.position && lhs.chromosome == rhs.chromosome
}

/// What to do with a window once its carriers reached the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The next variant is at the same site, sites are never split.
    SameSite,
    /// Only carrier-free variants follow; they join this window.
    ZeroTail,
    /// The following variants cannot reach the cutoff; they join this window.
    ShortTail,
    /// Close the window and open a new one at the next site.
    Close,
}

impl Boundary {
    /// Decide on the window boundary after a variant.
    ///
    /// `next_same_site` tells whether the next variant shares the site of the
    /// current one and `remaining` is the number of carriers of all variants
    /// after the current one.
    pub fn decide(next_same_site: bool, remaining: u64, ncutoff: u32) -> Self {
        if next_same_site {
            Boundary::SameSite
        } else if remaining == 0 {
            Boundary::ZeroTail
        } else if remaining < u64::from(ncutoff) {
            Boundary::ShortTail
        } else {
            Boundary::Close
        }
    }
}

/// Greedily pack `variants` into windows of at least `ncutoff` carriers.
///
/// Windows consist of consecutive sites.  Returns the zero-based window
/// number for each variant; `None` marks a variant that was not assigned.
pub fn pack_accumulation(variants: &[&VariantRecord], ncutoff: u32) -> Vec<Option<usize>> {
    let n = variants.len();
    let mut assignment = vec![None; n];

    // remaining[i] is the sum of carriers of variants[i..]
    let mut remaining = vec![0u64; n + 1];
    for i in (0..n).rev() {
        remaining[i] = remaining[i + 1] + u64::from(variants[i].carriers);
    }

    let mut window = 0;
    for start in 0..n {
        // Already covered by the window opened at an earlier site.
        if assignment[start].is_some() {
            continue;
        }

        assignment[start] = Some(window);
        let mut carriers = u64::from(variants[start].carriers);
        let mut closed = false;
        for x in (start + 1)..n {
            assignment[x] = Some(window);
            carriers += u64::from(variants[x].carriers);
            if carriers < u64::from(ncutoff) {
                continue;
            }

            let next_same_site = x + 1 < n && same_site(variants[x], variants[x + 1]);
            let boundary = Boundary::decide(next_same_site, remaining[x + 1], ncutoff);
            tracing::trace!(
                "window {} reached {} carriers at {}: {:?}",
                window,
                carriers,
                &variants[x].id,
                boundary
            );
            if boundary == Boundary::Close {
                closed = true;
                break;
            }
        }

        if closed {
            window += 1;
        } else {
            break;
        }
    }

    assignment
}

/// Check that `variants` are sorted by coordinate.
fn check_sorted(
    bucket: Bucket,
    variants: &[&VariantRecord],
    order: &CoordinateOrder,
) -> Result<(), WindowError> {
    for (previous, current) in variants.iter().tuple_windows() {
        if order.compare(
            (previous.chromosome.as_str(), previous.position),
            (current.chromosome.as_str(), current.position),
        ) == std::cmp::Ordering::Greater
        {
            return Err(WindowError::InputOrder {
                bucket: bucket.to_string(),
                previous: previous.id.clone(),
                current: current.id.clone(),
            });
        }
    }
    Ok(())
}

/// The variants of `bucket`, in input order.
fn select(variants: &[TaggedVariant], bucket: Bucket) -> Vec<&VariantRecord> {
    variants
        .iter()
        .filter(|tagged| tagged.bucket == bucket)
        .map(|tagged| &tagged.variant)
        .collect()
}

fn window_record(variant: &VariantRecord, window_id: String, bucket: Bucket) -> WindowRecord {
    WindowRecord {
        snp: variant.id.clone(),
        window_id,
        carriers: variant.carriers,
        solo_variant_window: bucket == Bucket::SoloVariant,
        position: variant.position,
        solo_site_window: bucket == Bucket::SoloSite,
        carriers_in_window: 0,
    }
}

/// Fill `carriers_in_window` and sort by position.
fn finalize(records: &mut [WindowRecord]) {
    let mut totals: IndexMap<String, u64> = IndexMap::new();
    for record in records.iter() {
        *totals.entry(record.window_id.clone()).or_default() += u64::from(record.carriers);
    }
    for record in records.iter_mut() {
        record.carriers_in_window = totals.get(&record.window_id).copied().unwrap_or_default();
    }
    records.sort_by_key(|record| record.position);
}

/// Assign the variants of `gene` to windows of at least `ncutoff` carriers.
///
/// The variants of each bucket must be sorted by coordinate.  Window numbers
/// are handed out to solo-variant windows first, then solo-site windows and
/// finally accumulation windows.  The result is sorted by position.
pub fn build_windows(
    variants: &[TaggedVariant],
    ncutoff: u32,
    gene: &str,
) -> Result<Vec<WindowRecord>, WindowError> {
    if ncutoff == 0 {
        return Err(WindowError::InvalidCutoff(ncutoff));
    }
    if let Some(foreign) = variants.iter().find(|tagged| tagged.variant.gene != gene) {
        return Err(WindowError::ForeignGene {
            variant: foreign.variant.id.clone(),
            expected: gene.to_string(),
            found: foreign.variant.gene.clone(),
        });
    }

    let order = CoordinateOrder::default();
    let solo_variants = select(variants, Bucket::SoloVariant);
    check_sorted(Bucket::SoloVariant, &solo_variants, &order)?;
    let solo_sites = select(variants, Bucket::SoloSite);
    check_sorted(Bucket::SoloSite, &solo_sites, &order)?;
    let accumulation = select(variants, Bucket::Accumulation);
    check_sorted(Bucket::Accumulation, &accumulation, &order)?;

    let mut counter = WindowCounter::new(gene, ncutoff);
    let mut result = Vec::with_capacity(variants.len());

    for variant in &solo_variants {
        result.push(window_record(variant, counter.name(0), Bucket::SoloVariant));
        counter.advance(1);
    }

    for (i, variant) in solo_sites.iter().enumerate() {
        result.push(window_record(variant, counter.name(0), Bucket::SoloSite));
        if i + 1 == solo_sites.len() || !same_site(variant, solo_sites[i + 1]) {
            counter.advance(1);
        }
    }

    let assignment = pack_accumulation(&accumulation, ncutoff);
    let unassigned = assignment.iter().filter(|window| window.is_none()).count();
    if unassigned > 0 {
        return Err(WindowError::IncompleteAssignment(unassigned));
    }
    for (variant, window) in accumulation.iter().zip(assignment.iter().flatten()) {
        result.push(window_record(variant, counter.name(*window), Bucket::Accumulation));
    }
    tracing::debug!(
        "{}: {} solo-variant, {} solo-site and {} accumulation variants",
        gene,
        solo_variants.len(),
        solo_sites.len(),
        accumulation.len()
    );

    finalize(&mut result);
    Ok(result)
}

/// Summary of one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSummary {
    pub window_id: String,
    pub variants: usize,
    pub carriers: u64,
    pub solo_variant_window: bool,
    pub solo_site_window: bool,
}

/// Summarize `records` per window, in order of first occurrence.
pub fn summarize(records: &[WindowRecord]) -> Vec<WindowSummary> {
    let mut result: IndexMap<&str, WindowSummary> = IndexMap::new();
    for record in records {
        let summary = result
            .entry(record.window_id.as_str())
            .or_insert_with(|| WindowSummary {
                window_id: record.window_id.clone(),
                variants: 0,
                carriers: 0,
                solo_variant_window: record.solo_variant_window,
                solo_site_window: record.solo_site_window,
            });
        summary.variants += 1;
        summary.carriers += u64::from(record.carriers);
    }
    result.into_values().collect()
}
