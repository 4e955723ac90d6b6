//! Tag-field value comparison.
//!
//! The editor's tag input serializes its state two ways. A freshly typed
//! article shows the tags as typed, space-separated. An article opened for
//! editing is pre-populated comma-separated, in no guaranteed order.

/// How the tag input rendered its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFieldFormat {
    /// Pre-populated for editing: `a,b,c`, order not significant
    EditView,
    /// Typed during creation: `a b c`, exact
    CreateView,
}

impl TagFieldFormat {
    /// Detect the format from the raw input value
    #[must_use]
    pub fn detect(raw: &str) -> Self {
        if raw.contains(',') {
            Self::EditView
        } else {
            Self::CreateView
        }
    }
}

/// What `expected` should look like in a field of the given format
#[must_use]
pub fn expected_field_value(format: TagFieldFormat, expected: &[String]) -> String {
    match format {
        TagFieldFormat::EditView => {
            let mut sorted = expected.to_vec();
            sorted.sort();
            sorted.join(",")
        }
        TagFieldFormat::CreateView => expected.join(" "),
    }
}

/// Normalize a raw field value for comparison with [`expected_field_value`]
#[must_use]
pub fn normalize_field_value(raw: &str) -> String {
    match TagFieldFormat::detect(raw) {
        TagFieldFormat::EditView => {
            let mut actual: Vec<&str> = raw.split(',').map(str::trim).collect();
            actual.sort_unstable();
            actual.join(",")
        }
        TagFieldFormat::CreateView => raw.to_string(),
    }
}

/// Whether the raw tag field value holds exactly `expected`
#[must_use]
pub fn tags_match_field(raw: &str, expected: &[String]) -> bool {
    let format = TagFieldFormat::detect(raw);
    normalize_field_value(raw) == expected_field_value(format, expected)
}
