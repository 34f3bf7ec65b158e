//! Group translation tasks into bounded per-file batches.

use crate::analyzer::TranslationTask;
use indexmap::IndexMap;

/// Tasks sharing one (language, file); the unit of one provider request.
pub type Batch = Vec<TranslationTask>;

/// Partition tasks by (language, file) in first-encounter order, then split
/// each group into consecutive chunks of at most `max_size` tasks.
///
/// A `max_size` of zero is treated as one.
pub fn group_into_batches(tasks: &[TranslationTask], max_size: usize) -> Vec<Batch> {
    let max_size = max_size.max(1);

    let mut grouped: IndexMap<(&str, &str), Vec<TranslationTask>> = IndexMap::new();
    for task in tasks {
        grouped
            .entry((task.language.as_str(), task.file_name.as_str()))
            .or_default()
            .push(task.clone());
    }

    grouped
        .into_values()
        .flat_map(|group| {
            group
                .chunks(max_size)
                .map(<[TranslationTask]>::to_vec)
                .collect::<Vec<_>>()
        })
        .collect()
}
