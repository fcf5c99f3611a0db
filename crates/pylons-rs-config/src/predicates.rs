//! The action predicate attached to handler views.

use std::hash::{Hash, Hasher};

use regex::Regex;

use pylons_rs_core::{PylonsError, PylonsResult};
use pylons_rs_http::{HttpRequest, Predicate, PredicateContext};

/// Matches requests whose `action` match-dict value fully matches a pattern.
///
/// The source uses `regex` crate syntax, which is stricter than some
/// engines: a stray `{` as in `a{` must be escaped (`a\{`) or it is rejected.
///
/// Two predicates built from the same source text are equal and hash the
/// same, so duplicates collapse in sets.
///
/// # Examples
///
/// ```
/// use pylons_rs_config::ActionPredicate;
/// use pylons_rs_http::{HttpRequest, Predicate};
///
/// let pred = ActionPredicate::new(Some("edit|update")).unwrap();
/// let request = HttpRequest::builder().match_value("action", "edit").build();
/// assert!(pred.matches(None, &request));
/// assert!(ActionPredicate::new(Some("[a-z")).is_err());
/// assert!(ActionPredicate::new(Some("a{")).is_err());
/// assert!(ActionPredicate::new(Some(r"a\{")).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ActionPredicate {
    source: String,
    regex: Regex,
}

impl ActionPredicate {
    /// Builds a predicate from an action name or regex source.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `action` is `None` or not a valid regex.
    pub fn new(action: Option<&str>) -> PylonsResult<Self> {
        let source = action.ok_or_else(|| {
            PylonsError::configuration("Action predicate requires an action, got None")
        })?;
        let invalid = |e: regex::Error| {
            PylonsError::ConfigurationError(format!(
                "The action name '{source}' is not a valid regular expression: {e}"
            ))
        };
        Regex::new(source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the source pattern.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Predicate for ActionPredicate {
    fn matches(&self, _context: Option<&PredicateContext>, request: &HttpRequest) -> bool {
        request
            .match_value("action")
            .is_some_and(|action| self.regex.is_match(action))
    }

    fn text(&self) -> String {
        format!("action = {}", self.source)
    }
}

impl PartialEq for ActionPredicate {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for ActionPredicate {}

impl Hash for ActionPredicate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}
