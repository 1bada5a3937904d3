/// Identifies which pair of termini a cell or path belongs to.
///
/// Real affiliations start at 1; 0 is reserved for "no affiliation".
pub type AffiliationID = usize;
