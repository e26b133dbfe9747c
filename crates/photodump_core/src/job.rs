use crate::staging::upload_url;

pub type JobId = u64;

/// Lifecycle of the single categorization job a session may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Starting,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    /// True while a job may still complete (the processing panel is shown).
    pub fn is_active(self) -> bool {
        matches!(self, JobState::Starting | JobState::Running)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Succeeded | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Decoded push-channel status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Categorizing,
    Processing,
    Complete { results: Option<ResultSet> },
    Cancelled,
    Error { message: Option<String> },
    Cleared,
    Unknown(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPhotos {
    pub category: String,
    pub photos: Vec<String>,
}

/// Category label -> ordered photo references, in the order the server listed them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    groups: Vec<CategoryPhotos>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(label, photos)` pairs. Labels are trimmed and blank labels dropped.
    pub fn from_groups<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: AsRef<str>,
    {
        let groups = groups
            .into_iter()
            .filter_map(|(label, photos)| {
                let category = label.as_ref().trim();
                if category.is_empty() {
                    None
                } else {
                    Some(CategoryPhotos {
                        category: category.to_string(),
                        photos,
                    })
                }
            })
            .collect();
        Self { groups }
    }

    /// Groups that have at least one photo; empty categories are never rendered.
    pub fn groups(&self) -> impl Iterator<Item = &CategoryPhotos> {
        self.groups.iter().filter(|group| !group.photos.is_empty())
    }

    /// Every group, including empty ones.
    pub fn all_groups(&self) -> &[CategoryPhotos] {
        &self.groups
    }

    pub fn photos_in(&self, category: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|group| group.category == category)
            .map(|group| group.photos.as_slice())
    }

    /// Image URLs in gallery order, as the results grid shows them.
    pub fn photo_urls(&self) -> Vec<String> {
        self.groups()
            .flat_map(|group| group.photos.iter().map(|photo| upload_url(photo)))
            .collect()
    }

    pub fn photo_count(&self) -> usize {
        self.groups.iter().map(|group| group.photos.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.photo_count() == 0
    }
}

/// Split the category input into ordered, trimmed, non-empty labels.
pub fn parse_categories(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
