/// Regional labor cost multipliers keyed by USPS code.
const STATE_LABOR_MULTIPLIERS: &[(&str, f64)] = &[
    ("AK", 1.25),
    ("AL", 0.85),
    ("AR", 0.84),
    ("AZ", 0.96),
    ("CA", 1.25),
    ("CO", 1.05),
    ("CT", 1.18),
    ("DC", 1.30),
    ("DE", 1.05),
    ("FL", 0.95),
    ("GA", 0.92),
    ("HI", 1.30),
    ("IA", 0.90),
    ("ID", 0.92),
    ("IL", 1.10),
    ("IN", 0.92),
    ("KS", 0.88),
    ("KY", 0.88),
    ("LA", 0.88),
    ("MA", 1.25),
    ("MD", 1.08),
    ("ME", 0.98),
    ("MI", 0.98),
    ("MN", 1.05),
    ("MO", 0.92),
    ("MS", 0.82),
    ("MT", 0.93),
    ("NC", 0.92),
    ("ND", 0.93),
    ("NE", 0.90),
    ("NH", 1.05),
    ("NJ", 1.20),
    ("NM", 0.90),
    ("NV", 1.02),
    ("NY", 1.30),
    ("OH", 0.95),
    ("OK", 0.87),
    ("OR", 1.10),
    ("PA", 1.05),
    ("RI", 1.12),
    ("SC", 0.88),
    ("SD", 0.86),
    ("TN", 0.90),
    ("TX", 0.95),
    ("UT", 0.97),
    ("VA", 1.02),
    ("VT", 1.00),
    ("WA", 1.15),
    ("WI", 0.98),
    ("WV", 0.85),
    ("WY", 0.92),
];

/// Canonical form of a caller-supplied state code.
pub fn normalize_state(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Lookup for a two-letter state code; unknown or missing codes map to 1.0.
pub fn state_multiplier(code: &str) -> f64 {
    let code = normalize_state(code);
    STATE_LABOR_MULTIPLIERS
        .binary_search_by(|(candidate, _)| (*candidate).cmp(code.as_str()))
        .map(|index| STATE_LABOR_MULTIPLIERS[index].1)
        .unwrap_or(1.0)
}
