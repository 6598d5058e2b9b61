//! Request templates and the parameters substituted into them.
//!
//! A request template is plain text (usually a WPS `Execute` document) with
//! `{name}` placeholders. [`substitute`] replaces every placeholder whose name
//! is a known token and leaves the rest untouched.

/// Replace every literal `{key}` in `template` with the value of `key`.
///
/// The template is scanned once, left to right. Inserted values are copied
/// through verbatim and never scanned again, so a value may itself contain
/// placeholder syntax. Matching is exact and case-sensitive; if a key appears
/// more than once the first value wins. Placeholders without a token are left
/// as they are; that is not an error.
pub fn substitute<'a, I>(template: &str, tokens: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let tokens: Vec<(&str, &str)> = tokens.into_iter().collect();
    let mut output = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        output.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let resolved = after.find('}').and_then(|close| {
            let name = &after[..close];
            tokens
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match resolved {
            Some((close, value)) => {
                output.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                output.push('{');
                rest = after;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Placeholder name to value mapping for one model request.
///
/// Always carries `url`, `identifier` and `coverage`, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestParameters {
    entries: Vec<(String, String)>,
}

impl RequestParameters {
    pub const URL: &'static str = "url";
    pub const IDENTIFIER: &'static str = "identifier";
    pub const COVERAGE: &'static str = "coverage";
    pub const MIME_TYPE: &'static str = "mimeType";

    pub fn new(
        url: impl Into<String>,
        identifier: impl Into<String>,
        coverage: impl Into<String>,
    ) -> Self {
        Self {
            entries: vec![
                (Self::URL.to_string(), url.into()),
                (Self::IDENTIFIER.to_string(), identifier.into()),
                (Self::COVERAGE.to_string(), coverage.into()),
            ],
        }
    }

    /// Set `key` to `value`. An existing key keeps its position.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The model service endpoint the request body is posted to.
    pub fn url(&self) -> &str {
        self.get(Self::URL).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RequestParameters {
    type Item = (&'a str, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// The parameter panel: the values a user edits before requesting a model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFields {
    pub url: String,
    pub workspace: String,
    pub layer: String,
    pub coverage: String,
}

impl FormFields {
    /// Snapshot the current field values into fresh request parameters.
    ///
    /// `identifier` is `workspace:layer`. `extra` entries are added last and
    /// override fields with the same name.
    pub fn collate<'a, I>(&self, extra: I) -> RequestParameters
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut parameters = RequestParameters::new(
            self.url.clone(),
            format!("{}:{}", self.workspace, self.layer),
            self.coverage.clone(),
        );
        for (key, value) in extra {
            parameters.insert(key, value);
        }
        parameters
    }
}
