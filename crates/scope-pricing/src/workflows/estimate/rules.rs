use super::domain::JobType;

/// Quantity that governs an archetype's price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Governing {
    pub(crate) quantity: f64,
    /// Written in the scope text, as opposed to measured or defaulted.
    pub(crate) explicit: bool,
}

impl Governing {
    pub(crate) fn explicit(quantity: f64) -> Self {
        Self {
            quantity,
            explicit: true,
        }
    }

    pub(crate) fn inferred(quantity: f64) -> Self {
        Self {
            quantity,
            explicit: false,
        }
    }
}

/// Signals shared by every trade's classifier.
pub(crate) trait TradeSignals {
    /// Heavy/remodel term found in the text, if any.
    fn heavy_term(&self) -> Option<&str>;
    /// True when an archetype's governing quantity was written as a count.
    fn has_explicit_units(&self) -> bool;
}

/// One `(predicate, archetype)` entry; rules are evaluated in priority order.
pub(crate) struct Rule<S> {
    pub(crate) job_type: JobType,
    /// The scope is about this archetype (vocabulary or quantities present, guards passed).
    pub(crate) claims: fn(&S) -> bool,
    pub(crate) governing: fn(&S) -> Option<Governing>,
    /// Explains the refusal when the archetype is claimed but unquantified.
    pub(crate) missing: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Classification {
    pub(crate) job_type: JobType,
    pub(crate) governing: Option<Governing>,
    pub(crate) ok_for_deterministic: bool,
    pub(crate) ok_for_verified: bool,
    pub(crate) notes: Vec<String>,
}

impl Classification {
    fn unknown(note: String) -> Self {
        Self {
            job_type: JobType::Unknown,
            governing: None,
            ok_for_deterministic: false,
            ok_for_verified: false,
            notes: vec![note],
        }
    }
}

/// First-match-wins classification with the empty-scope and heavy-scope guards in front.
pub(crate) fn classify<S: TradeSignals>(
    text: &str,
    rules: &[Rule<S>],
    signals: &S,
    fallback: &'static str,
) -> Classification {
    if text.trim().is_empty() {
        return Classification::unknown("scope text is empty".to_string());
    }

    if let Some(term) = signals.heavy_term() {
        if !signals.has_explicit_units() {
            return Classification::unknown(format!(
                "heavy/remodel scope ('{term}') without explicit counts; deterministic pricing declined"
            ));
        }
    }

    let Some(rule) = rules.iter().find(|rule| (rule.claims)(signals)) else {
        return Classification::unknown(fallback.to_string());
    };

    match (rule.governing)(signals) {
        Some(governing) => {
            let mut notes = vec![format!(
                "classified as {} (quantity {})",
                rule.job_type, governing.quantity
            )];
            if !governing.explicit {
                notes.push(format!(
                    "{} quantity was not stated explicitly; estimate is not verified",
                    rule.job_type
                ));
            }
            Classification {
                job_type: rule.job_type,
                governing: Some(governing),
                ok_for_deterministic: true,
                ok_for_verified: governing.explicit,
                notes,
            }
        }
        None => Classification::unknown(format!("{}: {}", rule.job_type, rule.missing)),
    }
}
