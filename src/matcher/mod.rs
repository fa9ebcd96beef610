pub mod crisis;

pub use crisis::is_crisis;

/// An ordered list of `(keyword group, payload)` pairs.
///
/// A keyword group is a pipe-delimited string such as `"anxiety|anxious|panic"`.
/// Lookup is first-match-wins in declared order: if the text matches several
/// groups, the payload of the earliest one is returned.
#[derive(Debug, Clone)]
pub struct KeywordTable<T> {
    groups: Vec<KeywordGroup<T>>,
}

#[derive(Debug, Clone)]
struct KeywordGroup<T> {
    keywords: Vec<String>,
    payload: T,
}

impl<T> KeywordTable<T> {
    pub fn new<S, I>(entries: I) -> Self where S: AsRef<str>, I: IntoIterator<Item = (S, T)> {
        let groups = entries
            .into_iter()
            .map(|(group, payload)| KeywordGroup {
                keywords: split_group(group.as_ref()),
                payload,
            })
            .collect();
        Self { groups }
    }

    pub fn find(&self, text: &str) -> Option<&T> {
        let haystack = text.to_lowercase();
        self.groups
            .iter()
            .find(|group| group.keywords.iter().any(|kw| haystack.contains(kw.as_str())))
            .map(|group| &group.payload)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Splits a pipe-delimited group into trimmed, lower-cased keywords.
/// Empty entries (`"a||b"`, trailing pipes) are dropped so they never match everything.
pub fn split_group(group: &str) -> Vec<String> {
    group
        .split('|')
        .map(|kw| kw.trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .collect()
}

/// True when any keyword is a case-insensitive substring of `text`.
pub fn contains_any<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .map(|kw| kw.as_ref().trim().to_lowercase())
        .filter(|kw| !kw.is_empty())
        .any(|kw| haystack.contains(kw.as_str()))
}
