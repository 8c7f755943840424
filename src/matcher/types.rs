#[derive(Debug, Clone, PartialEq)]
/// Highest-scoring catalog entry.
pub struct BestMatch {
    /// Candidate address as it appears in the catalog.
    pub candidate: String,
    /// Model score in `[0, 1]`.
    pub score: f32,
    /// Catalog position of the candidate.
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq)]
/// Outcome of one matching request.
pub enum MatchOutcome {
    /// A candidate was selected.
    Match(BestMatch),
    /// The catalog had no candidates.
    NoMatch,
    /// The query was empty or whitespace; the model was not invoked.
    EmptyInput,
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Match(_))
    }

    pub fn best(&self) -> Option<&BestMatch> {
        match self {
            MatchOutcome::Match(best) => Some(best),
            MatchOutcome::NoMatch | MatchOutcome::EmptyInput => None,
        }
    }

    pub fn score(&self) -> Option<f32> {
        self.best().map(|b| b.score)
    }

    /// Short machine-readable status.
    pub fn status(&self) -> &'static str {
        match self {
            MatchOutcome::Match(_) => "matched",
            MatchOutcome::NoMatch => "no_match",
            MatchOutcome::EmptyInput => "empty_input",
        }
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Match(best) => {
                write!(f, "best match: {}\nscore: {:.4}", best.candidate, best.score)
            }
            MatchOutcome::NoMatch => write!(f, "no match found"),
            MatchOutcome::EmptyInput => write!(f, "please enter an address"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One catalog entry with its score.
pub struct ScoredCandidate {
    pub candidate: String,
    pub score: f32,
    pub position: usize,
}
