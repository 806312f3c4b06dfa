//! Code for writing the window assignment.

use std::io::Write;
use std::path::Path;

use serde::{Serialize, Serializer};

/// Serialize `bool` as `1`/`0`.
fn serialize_flag<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Assignment of one variant to a window.
///
/// The field order determines the column order of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    /// variant identifier
    #[serde(rename = "SNP")]
    pub snp: String,
    /// window name, `{gene}_{ncutoff}_Window__{n}`
    #[serde(rename = "Window")]
    pub window_id: String,
    /// number of carriers of the variant
    pub carriers: u32,
    /// whether the variant alone forms the window
    #[serde(serialize_with = "serialize_flag")]
    pub solo_variant_window: bool,
    /// position of the variant
    #[serde(rename = "pos")]
    pub position: u64,
    /// whether the window consists of a single site
    #[serde(serialize_with = "serialize_flag")]
    pub solo_site_window: bool,
    /// number of carriers summed over the window
    pub carriers_in_window: u64,
}

/// Write `records` as TSV with header to `writer`.
pub fn write_records<W: Write>(writer: W, records: &[WindowRecord]) -> Result<(), anyhow::Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_writer(writer);

    // Written explicitly so that empty outputs still carry the header.
    writer.write_record([
        "SNP",
        "Window",
        "carriers",
        "solo_variant_window",
        "pos",
        "solo_site_window",
        "carriers_in_window",
    ])?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Write `records` to the (possibly gzipped) file at `path`.
pub fn write_file<P: AsRef<Path>>(path: P, records: &[WindowRecord]) -> Result<(), anyhow::Error> {
    let writer = crate::common::io::open_write_maybe_gz(&path).map_err(|e| {
        anyhow::anyhow!("Cannot open {:?} for writing: {:?}", path.as_ref(), e)
    })?;
    write_records(writer, records)
}
