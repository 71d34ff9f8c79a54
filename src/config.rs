/// Bound used when none is given or the argument does not parse.
pub const DEFAULT_BOUND: u64 = 100_000_000;

/// Parses the upper bound from an optional command line argument.
///
/// Absent, negative or otherwise malformed input falls back to
/// [`DEFAULT_BOUND`] without complaint.
pub fn parse_bound(arg: Option<&str>) -> u64 {
    arg.and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_BOUND)
}
