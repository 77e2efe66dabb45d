//! The named filter-construction step behind `GET /api/screenshots`.
//!
//! The default-visibility rule (entries tagged `draw` stay hidden unless the
//! caller asks for `draw` by name) lives here, as data, so the listing query
//! itself stays a mechanical translation of `TagFilter` into SQL.

/// Tag hidden from listings unless explicitly requested.
pub const HIDDEN_BY_DEFAULT_TAG: &str = "draw";

/// Effective listing filter: an entry matches when it carries every tag in
/// `required` and none of the tags in `excluded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub required: Vec<String>,
    pub excluded: Vec<String>,
}

impl TagFilter {
    /// Build the effective filter from the tag names the caller requested.
    ///
    /// Every requested name becomes a required tag (AND semantics across the
    /// set). The hidden-by-default tag is appended to `excluded` unless it is
    /// itself among the requested names; requesting it is the opt-in.
    pub fn from_requested<S: AsRef<str>>(requested: &[S]) -> Self {
        let required: Vec<String> = requested
            .iter()
            .map(|name| name.as_ref().trim().to_owned())
            .filter(|name| !name.is_empty())
            .collect();

        let excluded = if required.iter().any(|name| name == HIDDEN_BY_DEFAULT_TAG) {
            Vec::new()
        } else {
            vec![HIDDEN_BY_DEFAULT_TAG.to_owned()]
        };

        Self { required, excluded }
    }

    /// Build the filter from the raw `tags` query parameter, a comma-separated
    /// list of names. Absent or blank input yields the default listing filter.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if !value.trim().is_empty() => {
                let names: Vec<&str> = value.split(',').collect();
                Self::from_requested(&names)
            }
            _ => Self::from_requested::<&str>(&[]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_excludes_hidden_tag() {
        let filter = TagFilter::from_query(None);
        assert!(filter.required.is_empty());
        assert_eq!(filter.excluded, vec![HIDDEN_BY_DEFAULT_TAG.to_owned()]);
    }

    #[test]
    fn blank_query_is_the_default_filter() {
        assert_eq!(TagFilter::from_query(Some("")), TagFilter::from_query(None));
        assert_eq!(
            TagFilter::from_query(Some("   ")),
            TagFilter::from_query(None)
        );
    }

    #[test]
    fn requested_tags_are_all_required() {
        let filter = TagFilter::from_query(Some("Jan,Monday,5min"));
        assert_eq!(filter.required, vec!["Jan", "Monday", "5min"]);
        assert_eq!(filter.excluded, vec![HIDDEN_BY_DEFAULT_TAG.to_owned()]);
    }

    #[test]
    fn requesting_hidden_tag_lifts_the_exclusion() {
        let filter = TagFilter::from_query(Some("draw"));
        assert_eq!(filter.required, vec!["draw"]);
        assert!(filter.excluded.is_empty());

        let filter = TagFilter::from_query(Some("Jan,draw"));
        assert_eq!(filter.required, vec!["Jan", "draw"]);
        assert!(filter.excluded.is_empty());
    }

    #[test]
    fn surrounding_whitespace_and_empty_segments_are_dropped() {
        let filter = TagFilter::from_query(Some(" Jan , ,Monday,"));
        assert_eq!(filter.required, vec!["Jan", "Monday"]);
    }
}
