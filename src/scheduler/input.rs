use std::collections::HashSet;

/// Ordered, de-duplicated list of files that must be scheduled in this run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFileSet {
    files: Vec<String>,
    members: HashSet<String>,
}

impl InputFileSet {
    /// Build from raw entries, dropping blank entries and repeated files.
    /// The first occurrence of a file keeps its position.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut members = HashSet::new();
        let mut files = Vec::new();

        for entry in entries {
            let file = entry.as_ref().trim();
            if file.is_empty() {
                continue;
            }
            if !members.insert(file.to_string()) {
                tracing::debug!(filename = file, "Duplicate file in input, ignoring");
                continue;
            }
            files.push(file.to_string());
        }

        Self { files, members }
    }

    /// Parse newline separated input as supplied on stdin or in a list file.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split('\n'))
    }

    pub fn contains(&self, file: &str) -> bool {
        self.members.contains(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_drops_blank_lines() {
        let set = InputFileSet::parse("spec/a_spec.rb\n\n   \nspec/b_spec.rb\n");
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec!["spec/a_spec.rb", "spec/b_spec.rb"]
        );
    }

    #[test]
    fn parse_trims_carriage_returns() {
        let set = InputFileSet::parse("spec/a_spec.rb\r\nspec/b_spec.rb\r\n");
        assert!(set.contains("spec/a_spec.rb"));
        assert!(set.contains("spec/b_spec.rb"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let set = InputFileSet::new(["b", "a", "b", "c", "a"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_input() {
        let set = InputFileSet::parse("");
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
