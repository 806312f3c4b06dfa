use std::num::ParseIntError;

/// Errors raised while assigning variants to windows.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("carrier cutoff must be positive, got {0}")]
    InvalidCutoff(u32),
    #[error("{bucket} variants not sorted: {current} follows {previous}")]
    InputOrder {
        bucket: String,
        previous: String,
        current: String,
    },
    #[error("variant {variant} belongs to gene {found:?}, not {expected:?}")]
    ForeignGene {
        variant: String,
        expected: String,
        found: String,
    },
    #[error("{0} accumulation variant(s) were not assigned to any window")]
    IncompleteAssignment(usize),
}

/// Errors raised while parsing input values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("invalid variant identifier {0:?}, expected chrom:pos:ref:alt")]
    VariantIdInvalidFormat(String),
    #[error("invalid position in variant identifier")]
    VariantIdInvalidPos(#[from] ParseIntError),
}
